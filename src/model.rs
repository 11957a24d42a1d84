// 该文件是 larod-probe 项目的一部分。
// src/model.rs - 检测结果
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

#[derive(Debug, Clone, PartialEq)]
pub struct DetectItem {
  /// 在模型输出中的槽位序号
  pub index: usize,
  pub class_id: i64,
  pub score: f32,
  pub bbox: [f32; 4],    // [y_min, x_min, y_max, x_max]，归一化坐标
  pub bbox_px: [i32; 4], // [x_min, y_min, x_max, y_max]，像素坐标
}

impl fmt::Display for DetectItem {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let [y_min, x_min, y_max, x_max] = self.bbox;
    let [x_min_px, y_min_px, x_max_px, y_max_px] = self.bbox_px;
    write!(
      f,
      "Det {}: class={}, score={:.2}, \
       box_norm=(ymin={:.2}, xmin={:.2}, ymax={:.2}, xmax={:.2}), \
       box_px=(x_min={}, y_min={}, x_max={}, y_max={})",
      self.index,
      self.class_id,
      self.score,
      y_min,
      x_min,
      y_max,
      x_max,
      x_min_px,
      y_min_px,
      x_max_px,
      y_max_px
    )
  }
}

#[derive(Debug, Clone, Default)]
pub struct DetectResult {
  pub items: Box<[DetectItem]>,
}

impl DetectResult {
  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }
}

mod ssd;
pub use self::ssd::{DetectionSet, Disambiguation, SsdDecodeError, SsdOutputs};
