use serde::Serialize;
use std::collections::BTreeMap;

use super::angle::AngleSet;
use super::joints::{BodyFocusMode, Joint};
use crate::config::ScoringConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityResult {
    /// Per-joint similarity in [0, 1]; only joints present on both sides
    pub per_joint: BTreeMap<Joint, f32>,
    /// Mean of `per_joint`, 0 when no joint is comparable
    pub overall: f32,
    pub is_match: bool,
}

impl SimilarityResult {
    pub fn empty() -> Self {
        Self {
            per_joint: BTreeMap::new(),
            overall: 0.0,
            is_match: false,
        }
    }

    /// Overall score as a whole percentage
    pub fn accuracy_percent(&self) -> u32 {
        (self.overall * 100.0).round().clamp(0.0, 100.0) as u32
    }
}

/// Linear angle-difference scorer
pub struct SimilarityScorer {
    tolerance_degrees: f32,
    match_threshold: f32,
}

impl SimilarityScorer {
    pub fn new(tolerance_degrees: f32, match_threshold: f32) -> Self {
        Self {
            tolerance_degrees,
            match_threshold,
        }
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self::new(config.tolerance_degrees, config.match_threshold)
    }

    /// similarity = max(0, 1 - |ref - cur| / tolerance)
    pub fn joint_similarity(&self, reference: f32, current: f32) -> f32 {
        let difference = (reference - current).abs();
        (1.0 - difference / self.tolerance_degrees).clamp(0.0, 1.0)
    }

    pub fn score(&self, reference: &AngleSet, current: &AngleSet, mode: BodyFocusMode) -> SimilarityResult {
        let per_joint: BTreeMap<Joint, f32> = mode
            .joints()
            .filter_map(|joint| {
                let r = reference.get(&joint)?;
                let c = current.get(&joint)?;
                Some((joint, self.joint_similarity(*r, *c)))
            })
            .collect();

        if per_joint.is_empty() {
            return SimilarityResult::empty();
        }

        let overall = per_joint.values().sum::<f32>() / per_joint.len() as f32;
        SimilarityResult {
            is_match: overall >= self.match_threshold,
            per_joint,
            overall,
        }
    }
}
