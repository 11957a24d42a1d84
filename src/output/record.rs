// 该文件是 larod-probe 项目的一部分。
// src/output/record.rs - 检测结果文本记录
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
  model::DetectResult,
  output::{OutputError, Render, ensure_parent},
};

/// 每个检测一行: `class, score, ymin, xmin, ymax, xmax`
pub struct RecordOutput {
  path: PathBuf,
}

impl RecordOutput {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  fn format(result: &DetectResult) -> String {
    result
      .items
      .iter()
      .map(|item| {
        format!(
          "{}, {:.4}, {:.4}, {:.4}, {:.4}, {:.4}",
          item.class_id, item.score, item.bbox[0], item.bbox[1], item.bbox[2], item.bbox[3]
        )
      })
      .collect::<Vec<_>>()
      .join("\n")
  }
}

impl Render<DetectResult> for RecordOutput {
  type Error = OutputError;

  fn render(&self, result: &DetectResult) -> Result<(), Self::Error> {
    ensure_parent(&self.path)?;
    std::fs::write(&self.path, Self::format(result))?;
    info!("记录 {} 个检测到 {}", result.len(), self.path.display());
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::DetectItem;

  #[test]
  fn one_line_per_detection() {
    let result = DetectResult {
      items: vec![
        DetectItem {
          index: 0,
          class_id: 1,
          score: 0.5,
          bbox: [0.1, 0.2, 0.3, 0.4],
          bbox_px: [60, 30, 120, 90],
        },
        DetectItem {
          index: 4,
          class_id: 62,
          score: 0.75,
          bbox: [0.0, 0.0, 1.0, 1.0],
          bbox_px: [0, 0, 300, 300],
        },
      ]
      .into_boxed_slice(),
    };

    assert_eq!(
      RecordOutput::format(&result),
      "1, 0.5000, 0.1000, 0.2000, 0.3000, 0.4000\n62, 0.7500, 0.0000, 0.0000, 1.0000, 1.0000"
    );
  }
}
