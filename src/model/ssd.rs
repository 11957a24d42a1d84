// 该文件是 larod-probe 项目的一部分。
// src/model/ssd.rs - SSD 模型原始输出解码
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
use tracing::{debug, error, info, warn};

use crate::{
  config::DecodeConfig,
  input::RawOutputFile,
  model::{DetectItem, DetectResult},
};

const SSD_NUM_OUTPUTS: usize = 4;
const SSD_BOX_COORDS: usize = 4;

#[derive(Error, Debug)]
pub enum SsdDecodeError {
  #[error("预期模型输出数量为 4, 实际为 {0}")]
  OutputCountMismatch(usize),
  #[error("Boxes output size is not divisible by 4, unexpected format: {0} float32 values")]
  BoxesNotDivisible(usize),
  #[error("检测数量输出 {0} 为空")]
  EmptyCountTensor(PathBuf),
  #[error("输出 {path} 大小不匹配: 期望 {expected}, 实际 {actual}")]
  ShapeMismatch {
    path: PathBuf,
    expected: usize,
    actual: usize,
  },
  #[error("无法根据均值区分 scores/classes: {mid1} mean={mean1:.4}, {mid2} mean={mean2:.4}")]
  AmbiguousScores {
    mid1: String,
    mean1: f64,
    mid2: String,
    mean2: f64,
  },
}

/// 按大小排好序的四个模型输出
///
/// 最小的是检测数量，最大的是 boxes，中间两个大小相同，
/// 分别是 scores 和 classes，但无法仅凭大小区分。
#[derive(Debug)]
pub struct SsdOutputs {
  num_detections: RawOutputFile,
  mid1: RawOutputFile,
  mid2: RawOutputFile,
  boxes: RawOutputFile,
}

/// scores / classes 的判定结果
#[derive(Debug, Clone, PartialEq)]
pub struct Disambiguation {
  pub mean1: f64,
  pub mean2: f64,
  pub scores: PathBuf,
  pub classes: PathBuf,
  /// 均值无法区分，按固定顺序指定
  pub fallback: bool,
}

impl fmt::Display for Disambiguation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.fallback {
      write!(
        f,
        "Could not distinguish scores/classes by mean; falling back to fixed assignment."
      )
    } else {
      write!(
        f,
        "{} interpreted as scores, {} as classes",
        self.scores.display(),
        self.classes.display()
      )
    }
  }
}

fn mean(values: &[f32]) -> f64 {
  values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

fn looks_like_scores(mean: f64) -> bool {
  (0.0..=1.0).contains(&mean)
}

impl SsdOutputs {
  /// 按 float 数量升序（稳定排序）分配各输出的角色
  pub fn assign(mut files: Vec<RawOutputFile>) -> Result<Self, SsdDecodeError> {
    if files.len() != SSD_NUM_OUTPUTS {
      error!(
        "预期模型输出数量为 {}, 实际为 {}",
        SSD_NUM_OUTPUTS,
        files.len()
      );
      return Err(SsdDecodeError::OutputCountMismatch(files.len()));
    }

    files.sort_by_key(RawOutputFile::n_floats);
    let mut files = files.into_iter();
    let (Some(num_detections), Some(mid1), Some(mid2), Some(boxes)) =
      (files.next(), files.next(), files.next(), files.next())
    else {
      unreachable!("输出数量已检查");
    };

    if boxes.n_floats() % SSD_BOX_COORDS != 0 {
      error!("boxes 输出 {} 大小不能被 4 整除", boxes.path.display());
      return Err(SsdDecodeError::BoxesNotDivisible(boxes.n_floats()));
    }

    debug!(
      "角色分配: num_detections={}, mid1={}, mid2={}, boxes={}",
      num_detections.path.display(),
      mid1.path.display(),
      mid2.path.display(),
      boxes.path.display()
    );

    Ok(Self {
      num_detections,
      mid1,
      mid2,
      boxes,
    })
  }

  pub fn num_boxes(&self) -> usize {
    self.boxes.n_floats() / SSD_BOX_COORDS
  }

  /// 根据均值判断哪个中间输出是 scores
  ///
  /// scores 的均值落在 [0, 1]，classes 通常是大于 1 的类别编号。
  /// 两者都不满足时回退到固定顺序（mid2 为 scores），`strict` 时报错。
  pub fn disambiguate(&self, strict: bool) -> Result<Disambiguation, SsdDecodeError> {
    let mean1 = mean(&self.mid1.data);
    let mean2 = mean(&self.mid2.data);
    debug!("mid1 mean={:.4}, mid2 mean={:.4}", mean1, mean2);

    let (scores, classes, fallback) = if looks_like_scores(mean1) && mean2 > 1.0 {
      (&self.mid1, &self.mid2, false)
    } else if looks_like_scores(mean2) && mean1 > 1.0 {
      (&self.mid2, &self.mid1, false)
    } else if strict {
      error!("无法根据均值区分 scores/classes");
      return Err(SsdDecodeError::AmbiguousScores {
        mid1: self.mid1.path.display().to_string(),
        mean1,
        mid2: self.mid2.path.display().to_string(),
        mean2,
      });
    } else {
      warn!("无法根据均值区分 scores/classes，回退到固定顺序");
      (&self.mid2, &self.mid1, true)
    };

    Ok(Disambiguation {
      mean1,
      mean2,
      scores: scores.path.clone(),
      classes: classes.path.clone(),
      fallback,
    })
  }

  /// 按判定结果整理为检测集合
  pub fn into_detection_set(
    self,
    disambiguation: &Disambiguation,
  ) -> Result<DetectionSet, SsdDecodeError> {
    let num_boxes = self.num_boxes();

    let reported = self
      .num_detections
      .data
      .first()
      .copied()
      .ok_or_else(|| SsdDecodeError::EmptyCountTensor(self.num_detections.path.clone()))?;

    let (scores, classes) = if disambiguation.scores == self.mid1.path {
      (self.mid1, self.mid2)
    } else {
      (self.mid2, self.mid1)
    };

    for tensor in [&scores, &classes] {
      if tensor.n_floats() != num_boxes {
        error!(
          "输出 {} 大小为 {}, 与 num_boxes={} 不一致",
          tensor.path.display(),
          tensor.n_floats(),
          num_boxes
        );
        return Err(SsdDecodeError::ShapeMismatch {
          path: tensor.path.clone(),
          expected: num_boxes,
          actual: tensor.n_floats(),
        });
      }
    }

    let boxes = self
      .boxes
      .data
      .chunks_exact(SSD_BOX_COORDS)
      .map(|c| [c[0], c[1], c[2], c[3]])
      .collect::<Vec<_>>();

    DetectionSet::new(
      boxes,
      scores.data.into_vec(),
      classes.data.into_vec(),
      reported as i64,
    )
  }
}

/// 已按角色整理好的检测输出，按检测序号对齐
#[derive(Debug, Clone)]
pub struct DetectionSet {
  boxes: Box<[[f32; 4]]>, // [y_min, x_min, y_max, x_max]
  scores: Box<[f32]>,
  classes: Box<[f32]>,
  num_detections: i64,
}

impl DetectionSet {
  pub fn new(
    boxes: Vec<[f32; 4]>,
    scores: Vec<f32>,
    classes: Vec<f32>,
    num_detections: i64,
  ) -> Result<Self, SsdDecodeError> {
    let num_boxes = boxes.len();
    if scores.len() != num_boxes || classes.len() != num_boxes {
      return Err(SsdDecodeError::ShapeMismatch {
        path: PathBuf::new(),
        expected: num_boxes,
        actual: if scores.len() != num_boxes {
          scores.len()
        } else {
          classes.len()
        },
      });
    }

    Ok(Self {
      boxes: boxes.into_boxed_slice(),
      scores: scores.into_boxed_slice(),
      classes: classes.into_boxed_slice(),
      num_detections,
    })
  }

  pub fn num_boxes(&self) -> usize {
    self.boxes.len()
  }

  /// 模型报告的检测数量
  pub fn reported_detections(&self) -> i64 {
    self.num_detections
  }

  /// 实际遍历的检测数量，不超过 boxes 数量
  pub fn usable_detections(&self) -> usize {
    self.num_detections.clamp(0, self.num_boxes() as i64) as usize
  }

  pub fn decode(&self, config: &DecodeConfig) -> DetectResult {
    let n = self.usable_detections();
    let w = config.image_width as f32;
    let h = config.image_height as f32;

    let items = (0..n)
      .filter(|&i| self.scores[i] >= config.score_threshold)
      .map(|i| {
        let [y_min, x_min, y_max, x_max] = self.boxes[i];
        DetectItem {
          index: i,
          class_id: self.classes[i] as i64,
          score: self.scores[i],
          bbox: self.boxes[i],
          bbox_px: [
            (x_min * w) as i32,
            (y_min * h) as i32,
            (x_max * w) as i32,
            (y_max * h) as i32,
          ],
        }
      })
      .collect::<Vec<_>>();

    info!("{} 个检测中 {} 个超过阈值 {}", n, items.len(), config.score_threshold);

    DetectResult {
      items: items.into_boxed_slice(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(name: &str, values: &[f32]) -> RawOutputFile {
    let bytes = values.iter().flat_map(|v| v.to_le_bytes()).collect::<Vec<_>>();
    RawOutputFile::from_bytes(name, &bytes)
  }

  fn boxes(n: usize) -> Vec<f32> {
    (0..n).flat_map(|_| [0.1, 0.2, 0.5, 0.5015]).collect()
  }

  #[test]
  fn roles_follow_size_not_name() {
    let files = vec![
      raw("test_out0.bin", &boxes(3)),
      raw("test_out1.bin", &[1.0, 2.0, 3.0]),
      raw("test_out2.bin", &[0.9, 0.8, 0.7]),
      raw("test_out3.bin", &[2.0]),
    ];

    let outputs = SsdOutputs::assign(files).unwrap();
    assert_eq!(outputs.num_boxes(), 3);
    assert_eq!(outputs.num_detections.path, PathBuf::from("test_out3.bin"));
    assert_eq!(outputs.boxes.path, PathBuf::from("test_out0.bin"));
    // 大小相同时保持文件名顺序
    assert_eq!(outputs.mid1.path, PathBuf::from("test_out1.bin"));
    assert_eq!(outputs.mid2.path, PathBuf::from("test_out2.bin"));
  }

  #[test]
  fn heuristic_finds_scores_in_either_slot() {
    let scores = [0.9, 0.4, 0.1];
    let classes = [1.0, 18.0, 3.0];

    for (first, second, expected_scores) in [
      (&scores, &classes, "test_out1.bin"),
      (&classes, &scores, "test_out2.bin"),
    ] {
      let files = vec![
        raw("test_out0.bin", &[3.0]),
        raw("test_out1.bin", first),
        raw("test_out2.bin", second),
        raw("test_out3.bin", &boxes(3)),
      ];
      let outputs = SsdOutputs::assign(files).unwrap();
      let d = outputs.disambiguate(true).unwrap();
      assert!(!d.fallback);
      assert_eq!(d.scores, PathBuf::from(expected_scores));

      let set = outputs.into_detection_set(&d).unwrap();
      assert_eq!(&*set.scores, &scores);
      assert_eq!(&*set.classes, &classes);
    }
  }

  #[test]
  fn ambiguous_means_fall_back_to_second() {
    let files = vec![
      raw("a.bin", &[2.0]),
      raw("b.bin", &[0.2, 0.4]),
      raw("c.bin", &[0.5, 0.6]),
      raw("d.bin", &boxes(2)),
    ];
    let outputs = SsdOutputs::assign(files).unwrap();
    let d = outputs.disambiguate(false).unwrap();
    assert!(d.fallback);
    assert_eq!(d.scores, PathBuf::from("c.bin"));
    assert_eq!(d.classes, PathBuf::from("b.bin"));
    assert!((d.mean1 - 0.3).abs() < 1e-6);
    assert_eq!(
      d.to_string(),
      "Could not distinguish scores/classes by mean; falling back to fixed assignment."
    );

    let err = outputs.disambiguate(true).unwrap_err();
    assert!(matches!(err, SsdDecodeError::AmbiguousScores { .. }));
  }

  #[test]
  fn boxes_must_divide_by_four() {
    let files = vec![
      raw("a.bin", &[1.0]),
      raw("b.bin", &[0.2, 0.4]),
      raw("c.bin", &[5.0, 6.0]),
      raw("d.bin", &[0.0; 7]),
    ];
    let err = SsdOutputs::assign(files).unwrap_err();
    assert!(matches!(err, SsdDecodeError::BoxesNotDivisible(7)));
  }

  #[test]
  fn middle_outputs_must_match_box_count() {
    let files = vec![
      raw("a.bin", &[1.0]),
      raw("b.bin", &[0.2, 0.4]),
      raw("c.bin", &[5.0, 6.0]),
      raw("d.bin", &boxes(3)),
    ];
    let outputs = SsdOutputs::assign(files).unwrap();
    let d = outputs.disambiguate(false).unwrap();
    let err = outputs.into_detection_set(&d).unwrap_err();
    assert!(matches!(
      err,
      SsdDecodeError::ShapeMismatch {
        expected: 3,
        actual: 2,
        ..
      }
    ));
  }

  #[test]
  fn wrong_output_count() {
    let err = SsdOutputs::assign(vec![raw("a.bin", &[1.0])]).unwrap_err();
    assert!(matches!(err, SsdDecodeError::OutputCountMismatch(1)));
  }

  #[test]
  fn threshold_is_inclusive() {
    let set = DetectionSet::new(
      vec![[0.0, 0.0, 1.0, 1.0]; 3],
      vec![0.3, 0.29999, 0.31],
      vec![1.0, 2.0, 3.0],
      3,
    )
    .unwrap();

    let result = set.decode(&DecodeConfig::default());
    let kept = result.items.iter().map(|i| i.index).collect::<Vec<_>>();
    assert_eq!(kept, vec![0, 2]);
  }

  #[test]
  fn reported_count_is_clamped() {
    let set = DetectionSet::new(vec![[0.0; 4]; 2], vec![0.9, 0.9], vec![1.0, 1.0], 10).unwrap();
    assert_eq!(set.reported_detections(), 10);
    assert_eq!(set.usable_detections(), 2);
    assert_eq!(set.decode(&DecodeConfig::default()).len(), 2);

    let set = DetectionSet::new(vec![[0.0; 4]; 2], vec![0.9, 0.9], vec![1.0, 1.0], -1).unwrap();
    assert_eq!(set.usable_detections(), 0);
    assert!(set.decode(&DecodeConfig::default()).is_empty());

    let set = DetectionSet::new(vec![[0.0; 4]; 2], vec![0.9, 0.9], vec![1.0, 1.0], 1).unwrap();
    assert_eq!(set.decode(&DecodeConfig::default()).len(), 1);
  }

  #[test]
  fn pixel_box_truncates() {
    let set = DetectionSet::new(vec![[0.1, 0.5, 0.5015, 0.999]], vec![0.8], vec![17.9], 1).unwrap();
    let result = set.decode(&DecodeConfig::default());
    let item = &result.items[0];
    assert_eq!(item.class_id, 17);
    // [x_min, y_min, x_max, y_max]
    assert_eq!(item.bbox_px, [150, 30, 299, 150]);

    let result = set.decode(&DecodeConfig::default().with_image_size(640, 480));
    assert_eq!(result.items[0].bbox_px, [320, 48, 639, 240]);
  }
}
