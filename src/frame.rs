// 该文件是 larod-probe 项目的一部分。
// src/frame.rs - NHWC 帧定义
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use thiserror::Error;

pub const RGB_CHANNELS: usize = 3;

#[derive(Error, Debug)]
#[error("数据长度不匹配: 期望长度 {expected}, 实际长度 {actual}")]
pub struct FrameSizeError {
  pub expected: usize,
  pub actual: usize,
}

/// 行优先、通道交错 (R,G,B) 的 8 位图像帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbNhwcFrame {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl RgbNhwcFrame {
  pub fn with_shape(width: u32, height: u32) -> Self {
    let size = RGB_CHANNELS * (width as usize) * (height as usize);
    Self {
      width,
      height,
      data: vec![0u8; size].into_boxed_slice(),
    }
  }

  pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameSizeError> {
    let expected = RGB_CHANNELS * (width as usize) * (height as usize);
    if data.len() != expected {
      return Err(FrameSizeError {
        expected,
        actual: data.len(),
      });
    }

    Ok(Self {
      width,
      height,
      data: data.into_boxed_slice(),
    })
  }

  pub fn height(&self) -> usize {
    self.height as usize
  }

  pub fn width(&self) -> usize {
    self.width as usize
  }

  pub fn channels(&self) -> usize {
    RGB_CHANNELS
  }

  /// 读取 (x, y) 处的像素
  pub fn pixel(&self, x: usize, y: usize) -> [u8; 3] {
    let index = (y * self.width() + x) * RGB_CHANNELS;
    [self.data[index], self.data[index + 1], self.data[index + 2]]
  }

  pub fn as_nhwc(&self) -> &[u8] {
    &self.data
  }
}

impl AsMut<[u8]> for RgbNhwcFrame {
  fn as_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn from_vec_checks_length() {
    let err = RgbNhwcFrame::from_vec(2, 2, vec![0; 11]).unwrap_err();
    assert_eq!(err.expected, 12);
    assert_eq!(err.actual, 11);

    let frame = RgbNhwcFrame::from_vec(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(frame.pixel(1, 0), [4, 5, 6]);
  }

  #[test]
  fn with_shape_is_zeroed() {
    let mut frame = RgbNhwcFrame::with_shape(4, 3);
    assert_eq!(frame.as_nhwc().len(), 4 * 3 * 3);
    assert!(frame.as_nhwc().iter().all(|&v| v == 0));
    frame.as_mut()[0] = 7;
    assert_eq!(frame.pixel(0, 0), [7, 0, 0]);
  }
}
