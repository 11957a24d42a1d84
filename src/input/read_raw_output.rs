// 该文件是 larod-probe 项目的一部分。
// src/input/read_raw_output.rs - 模型原始输出文件读取
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

use std::{fmt, path::PathBuf};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::DecodeConfig;

const F32_SIZE: usize = std::mem::size_of::<f32>();

#[derive(Error, Debug)]
pub enum RawOutputError {
  #[error("无效的匹配模式 '{0}': {1}")]
  InvalidPattern(String, glob::PatternError),
  #[error("遍历匹配文件失败: {0}")]
  GlobError(#[from] glob::GlobError),
  #[error("Expected {expected} output files, found {found}: {files:?}")]
  OutputCountMismatch {
    expected: usize,
    found: usize,
    files: Vec<PathBuf>,
  },
  #[error("读取文件 {0} 失败: {1}")]
  IoError(PathBuf, std::io::Error),
}

/// 一个无文件头的 float32 原始输出文件
#[derive(Debug, Clone)]
pub struct RawOutputFile {
  pub path: PathBuf,
  pub size_bytes: usize,
  pub data: Box<[f32]>,
}

impl RawOutputFile {
  pub fn load(path: impl Into<PathBuf>) -> Result<Self, RawOutputError> {
    let path = path.into();
    let bytes = std::fs::read(&path).map_err(|e| RawOutputError::IoError(path.clone(), e))?;
    Ok(Self::from_bytes(path, &bytes))
  }

  /// 按小端 float32 解析，末尾不足 4 字节的部分直接丢弃
  pub fn from_bytes(path: impl Into<PathBuf>, bytes: &[u8]) -> Self {
    let data = bytes
      .chunks_exact(F32_SIZE)
      .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
      .collect::<Vec<_>>();

    Self {
      path: path.into(),
      size_bytes: bytes.len(),
      data: data.into_boxed_slice(),
    }
  }

  pub fn n_floats(&self) -> usize {
    self.data.len()
  }
}

impl fmt::Display for RawOutputFile {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}: {} bytes, {} float32 values",
      self.path.display(),
      self.size_bytes,
      self.n_floats()
    )
  }
}

/// 按模式匹配并读取全部原始输出文件，文件按名称排序
pub fn read_raw_outputs(config: &DecodeConfig) -> Result<Vec<RawOutputFile>, RawOutputError> {
  let mut files = glob::glob(&config.pattern)
    .map_err(|e| RawOutputError::InvalidPattern(config.pattern.clone(), e))?
    .collect::<Result<Vec<_>, _>>()?;
  files.sort();

  debug!("模式 {} 匹配到: {:?}", config.pattern, files);

  if files.len() != config.expected_outputs {
    error!(
      "预期输出文件数量为 {}, 实际为 {}",
      config.expected_outputs,
      files.len()
    );
    return Err(RawOutputError::OutputCountMismatch {
      expected: config.expected_outputs,
      found: files.len(),
      files,
    });
  }

  let outputs = files
    .into_iter()
    .map(RawOutputFile::load)
    .collect::<Result<Vec<_>, _>>()?;

  for output in &outputs {
    info!("已读取 {}", output);
  }

  Ok(outputs)
}
