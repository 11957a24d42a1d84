// 该文件是 larod-probe 项目的一部分。
// src/output/save_raw_file.rs - 保存原始像素文件
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

use std::path::PathBuf;

use tracing::info;

use crate::{
  frame::RgbNhwcFrame,
  output::{OutputError, Render, ensure_parent},
};

/// 将帧按 uint8 原样写出，无文件头
pub struct SaveRawFileOutput {
  path: PathBuf,
}

impl SaveRawFileOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl Render<RgbNhwcFrame> for SaveRawFileOutput {
  type Error = OutputError;

  fn render(&self, frame: &RgbNhwcFrame) -> Result<(), Self::Error> {
    ensure_parent(&self.path)?;
    std::fs::write(&self.path, frame.as_nhwc())?;

    info!(
      "保存原始图像到文件: {} ({} 字节)",
      self.path.display(),
      frame.as_nhwc().len()
    );

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn writes_exact_bytes() {
    let dir = std::env::temp_dir().join(format!("larod-probe-raw-{}", std::process::id()));
    let path = dir.join("nested").join("frame.bin");

    let frame = RgbNhwcFrame::from_vec(2, 1, vec![9, 8, 7, 6, 5, 4]).unwrap();
    SaveRawFileOutput::new(&path).render(&frame).unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), vec![9, 8, 7, 6, 5, 4]);
    std::fs::remove_dir_all(dir).ok();
  }
}
