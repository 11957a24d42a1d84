// 该文件是 larod-probe 项目的一部分。
// src/bin/img_converter.rs - 图像转原始像素文件
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
use clap::{ArgAction, Parser};
use tracing::info;

use larod_probe::{
  config::{DEFAULT_RAW_IMAGE_PATH, PrepareConfig},
  task::{PrepareTask, Task},
};

/// 将图像转换为模型输入所需的原始 RGB 像素文件
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_help_flag = true)]
pub struct Args {
  /// 输入图像路径
  #[arg(short, long, value_name = "FILE")]
  pub input: PathBuf,
  /// 缩放后的宽度
  #[arg(short, long, value_name = "WIDTH")]
  pub width: u32,
  /// 缩放后的高度
  #[arg(short = 'h', long, value_name = "HEIGHT")]
  pub height: u32,
  /// 输出的原始像素文件
  #[arg(short, long, value_name = "OUTPUT", default_value = DEFAULT_RAW_IMAGE_PATH)]
  pub output: PathBuf,

  /// Print help
  #[arg(long, action = ArgAction::Help)]
  pub help: Option<bool>,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("输入图像: {}", args.input.display());
  info!("目标尺寸: {}x{}", args.width, args.height);
  info!("输出路径: {}", args.output.display());

  let config = PrepareConfig::new(&args.input, args.width, args.height).with_output(&args.output);
  let frame = PrepareTask::new(config).run_task()?;

  println!(
    "{}: {} bytes ({}x{}x{})",
    args.output.display(),
    frame.as_nhwc().len(),
    frame.width(),
    frame.height(),
    frame.channels()
  );

  Ok(())
}
