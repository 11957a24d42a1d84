// 该文件是 larod-probe 项目的一部分。
// src/config.rs - 工具参数配置
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

// 解码默认参数
pub const DEFAULT_OUTPUT_PATTERN: &str = "test_out*.bin";
pub const DEFAULT_EXPECTED_OUTPUTS: usize = 4;
pub const DEFAULT_IMAGE_WIDTH: u32 = 300;
pub const DEFAULT_IMAGE_HEIGHT: u32 = 300;
pub const DEFAULT_SCORE_THRESHOLD: f32 = 0.3;

// 图像转换默认输出
pub const DEFAULT_RAW_IMAGE_PATH: &str = "dog.bin";

/// 图像转换参数
#[derive(Debug, Clone)]
pub struct PrepareConfig {
  pub input: PathBuf,
  pub width: u32,
  pub height: u32,
  pub output: PathBuf,
}

impl PrepareConfig {
  pub fn new(input: impl Into<PathBuf>, width: u32, height: u32) -> Self {
    Self {
      input: input.into(),
      width,
      height,
      output: PathBuf::from(DEFAULT_RAW_IMAGE_PATH),
    }
  }

  pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
    self.output = output.into();
    self
  }
}

/// 模型输出解码参数
#[derive(Debug, Clone)]
pub struct DecodeConfig {
  /// 原始输出文件的 glob 匹配模式
  pub pattern: String,
  /// 期望匹配到的输出文件数量
  pub expected_outputs: usize,
  /// 送入模型的图像宽度，仅用于换算像素坐标
  pub image_width: u32,
  /// 送入模型的图像高度，仅用于换算像素坐标
  pub image_height: u32,
  pub score_threshold: f32,
  /// 无法区分 scores / classes 时直接报错，而不是回退到固定顺序
  pub strict: bool,
}

impl Default for DecodeConfig {
  fn default() -> Self {
    Self {
      pattern: DEFAULT_OUTPUT_PATTERN.to_string(),
      expected_outputs: DEFAULT_EXPECTED_OUTPUTS,
      image_width: DEFAULT_IMAGE_WIDTH,
      image_height: DEFAULT_IMAGE_HEIGHT,
      score_threshold: DEFAULT_SCORE_THRESHOLD,
      strict: false,
    }
  }
}

impl DecodeConfig {
  pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
    self.pattern = pattern.into();
    self
  }

  pub fn with_image_size(mut self, width: u32, height: u32) -> Self {
    self.image_width = width;
    self.image_height = height;
    self
  }

  pub fn with_score_threshold(mut self, threshold: f32) -> Self {
    self.score_threshold = threshold;
    self
  }

  pub fn with_strict(mut self, strict: bool) -> Self {
    self.strict = strict;
    self
  }
}
