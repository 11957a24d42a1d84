// 该文件是 larod-probe 项目的一部分。
// src/task.rs - 工具任务
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

use std::fmt;

use tracing::info;

use crate::{
  config::DecodeConfig,
  input::{RawOutputFile, read_raw_outputs},
  model::{DetectResult, Disambiguation, SsdOutputs},
};

pub trait Task: Sized {
  type Output;
  type Error;
  fn run_task(self) -> Result<Self::Output, Self::Error>;
}

/// 读取图像、缩放并写出原始像素文件
#[cfg(feature = "read_image_file")]
pub struct PrepareTask {
  config: crate::config::PrepareConfig,
}

#[cfg(feature = "read_image_file")]
impl PrepareTask {
  pub fn new(config: crate::config::PrepareConfig) -> Self {
    Self { config }
  }
}

#[cfg(feature = "read_image_file")]
impl Task for PrepareTask {
  type Output = crate::frame::RgbNhwcFrame;
  type Error = anyhow::Error;

  fn run_task(self) -> Result<Self::Output, Self::Error> {
    use crate::output::{Render, SaveRawFileOutput};

    info!("开始转换图像...");
    // 解码失败时直接返回，不写出任何文件
    let frame = crate::input::prepare_image(&self.config)?;
    SaveRawFileOutput::new(&self.config.output).render(&frame)?;
    info!("转换完成");
    Ok(frame)
  }
}

/// 一次解码的全部诊断信息与检测结果
#[derive(Debug)]
pub struct DecodeReport {
  pub files: Vec<RawOutputFile>,
  pub num_boxes: usize,
  pub disambiguation: Disambiguation,
  pub reported_detections: i64,
  pub usable_detections: usize,
  pub result: DetectResult,
}

impl fmt::Display for DecodeReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for file in &self.files {
      writeln!(f, "{}", file)?;
    }
    writeln!(f, "Inferred num_boxes = {}", self.num_boxes)?;
    writeln!(
      f,
      "mid1 mean={:.4}, mid2 mean={:.4}",
      self.disambiguation.mean1, self.disambiguation.mean2
    )?;
    writeln!(f, "{}", self.disambiguation)?;
    write!(
      f,
      "Model reports num_detections={}, using n={}",
      self.reported_detections, self.usable_detections
    )?;
    for item in self.result.items.iter() {
      write!(f, "\n{}", item)?;
    }
    Ok(())
  }
}

/// 读取模型的四个原始输出并解码检测结果
pub struct DecodeTask {
  config: DecodeConfig,
}

impl DecodeTask {
  pub fn new(config: DecodeConfig) -> Self {
    Self { config }
  }
}

impl Task for DecodeTask {
  type Output = DecodeReport;
  type Error = anyhow::Error;

  fn run_task(self) -> Result<Self::Output, Self::Error> {
    info!("开始解码模型输出: {}", self.config.pattern);
    let files = read_raw_outputs(&self.config)?;

    let outputs = SsdOutputs::assign(files.clone())?;
    let num_boxes = outputs.num_boxes();
    info!("推断 num_boxes = {}", num_boxes);

    let disambiguation = outputs.disambiguate(self.config.strict)?;
    info!("{}", disambiguation);

    let set = outputs.into_detection_set(&disambiguation)?;
    let result = set.decode(&self.config);

    Ok(DecodeReport {
      files,
      num_boxes,
      disambiguation,
      reported_detections: set.reported_detections(),
      usable_detections: set.usable_detections(),
      result,
    })
  }
}
