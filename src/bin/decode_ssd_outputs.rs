// 该文件是 larod-probe 项目的一部分。
// src/bin/decode_ssd_outputs.rs - 解码 SSD 模型原始输出
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

use anyhow::Result;
use clap::Parser;
use tracing::info;

use larod_probe::{
  config::{
    DEFAULT_IMAGE_HEIGHT, DEFAULT_IMAGE_WIDTH, DEFAULT_OUTPUT_PATTERN, DEFAULT_SCORE_THRESHOLD,
    DecodeConfig,
  },
  output::{RecordOutput, Render},
  task::{DecodeTask, Task},
};

/// 解码 SSD 模型的四个 float32 原始输出并打印检测结果
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 原始输出文件匹配模式
  #[arg(long, value_name = "GLOB", default_value = DEFAULT_OUTPUT_PATTERN)]
  pub pattern: String,
  /// 送入模型的图像宽度
  #[arg(long, value_name = "WIDTH", default_value_t = DEFAULT_IMAGE_WIDTH)]
  pub image_width: u32,
  /// 送入模型的图像高度
  #[arg(long, value_name = "HEIGHT", default_value_t = DEFAULT_IMAGE_HEIGHT)]
  pub image_height: u32,
  /// 置信度阈值
  #[arg(long, value_name = "THRESHOLD", default_value_t = DEFAULT_SCORE_THRESHOLD)]
  pub score_threshold: f32,
  /// 无法区分 scores/classes 时报错退出
  #[arg(long)]
  pub strict: bool,
  /// 将检测结果记录到文本文件
  #[arg(long, value_name = "FILE")]
  pub record: Option<PathBuf>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("匹配模式: {}", args.pattern);
  info!("图像尺寸: {}x{}", args.image_width, args.image_height);
  info!("置信度阈值: {}", args.score_threshold);

  let config = DecodeConfig::default()
    .with_pattern(args.pattern)
    .with_image_size(args.image_width, args.image_height)
    .with_score_threshold(args.score_threshold)
    .with_strict(args.strict);

  let report = DecodeTask::new(config).run_task()?;
  println!("{}", report);

  if let Some(path) = args.record {
    RecordOutput::new(path).render(&report.result)?;
  }

  Ok(())
}
