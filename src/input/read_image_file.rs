// 该文件是 larod-probe 项目的一部分。
// src/input/read_image_file.rs - 图像文件输入
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

use std::path::Path;

use image::{ImageReader, RgbImage, imageops::FilterType};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::{config::PrepareConfig, frame::RgbNhwcFrame};

// 与常见图像库 resize 的默认重采样一致（双三次）
const DEFAULT_RESAMPLE_FILTER: FilterType = FilterType::CatmullRom;

#[derive(Error, Debug)]
pub enum ImageFileInputError {
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
  #[error("无效的目标尺寸: {0}x{1}")]
  InvalidSize(u32, u32),
}

pub struct ImageFileInput {
  image: RgbImage,
}

impl ImageFileInput {
  /// 打开并解码图像，统一转换为 3 通道 RGB（丢弃 alpha / 调色板）
  pub fn open(path: impl AsRef<Path>) -> Result<Self, ImageFileInputError> {
    let path = path.as_ref();
    info!("读取图像文件: {}", path.display());

    let image = ImageReader::open(path)?
      .with_guessed_format()?
      .decode()
      .inspect_err(|e| error!("无法解码图像 {}: {}", path.display(), e))?;
    debug!(
      "原始图像: {}x{} {:?}",
      image.width(),
      image.height(),
      image.color()
    );

    Ok(ImageFileInput {
      image: image.to_rgb8(),
    })
  }

  pub fn dimensions(&self) -> (u32, u32) {
    self.image.dimensions()
  }

  /// 缩放到精确的 (width, height)，不保持宽高比
  pub fn resize(self, width: u32, height: u32) -> Result<Self, ImageFileInputError> {
    if width == 0 || height == 0 {
      error!("目标尺寸不能为零: {}x{}", width, height);
      return Err(ImageFileInputError::InvalidSize(width, height));
    }

    let image = image::imageops::resize(&self.image, width, height, DEFAULT_RESAMPLE_FILTER);
    debug!("缩放后图像: {}x{}", image.width(), image.height());
    Ok(ImageFileInput { image })
  }

  pub fn into_nhwc(self) -> RgbNhwcFrame {
    RgbNhwcFrame::from(self.image)
  }
}

impl From<RgbImage> for RgbNhwcFrame {
  fn from(image: RgbImage) -> Self {
    let mut frame = {
      let (width, height) = image.dimensions();
      RgbNhwcFrame::with_shape(width, height)
    };

    // RgbImage 本身即为行优先、通道交错存储
    frame.as_mut().copy_from_slice(image.as_raw());
    frame
  }
}

/// 读取、转换并缩放图像，得到可直接送入模型的帧
pub fn prepare_image(config: &PrepareConfig) -> Result<RgbNhwcFrame, ImageFileInputError> {
  let frame = ImageFileInput::open(&config.input)?
    .resize(config.width, config.height)?
    .into_nhwc();
  info!("图像已转换为 {}x{} RGB", frame.width(), frame.height());
  Ok(frame)
}
