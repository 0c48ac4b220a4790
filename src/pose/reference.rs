//! Reference poses as handed over by the storage side.
//!
//! A plan is a JSON array of poses, each either a captured landmark set or a
//! precomputed angle set:
//!
//! ```json
//! [
//!   {"name": "Warrior II", "position": 1, "landmarks": [{"index": 11, "x": 0.4, "y": 0.3, "z": 0.0, "visibility": 0.9}]},
//!   {"name": "Squat", "position": 2, "angles": {"left_knee": 95.0, "right_knee": 95.0}}
//! ]
//! ```

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::landmark::{IndexedLandmark, LandmarkFrame};
use crate::tracker::{AngleExtractor, AngleSet, BodyFocusMode};

#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceTarget {
    Landmarks(LandmarkFrame),
    Angles(AngleSet),
}

/// Target posture for one workout step
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePose {
    pub name: String,
    /// Ordinal within the workout
    pub position: u32,
    pub target: ReferenceTarget,
}

impl ReferencePose {
    pub fn from_landmarks(name: impl Into<String>, position: u32, frame: LandmarkFrame) -> Self {
        Self {
            name: name.into(),
            position,
            target: ReferenceTarget::Landmarks(frame),
        }
    }

    pub fn from_angles(name: impl Into<String>, position: u32, angles: AngleSet) -> Self {
        Self {
            name: name.into(),
            position,
            target: ReferenceTarget::Angles(angles),
        }
    }

    /// Angle set this pose is scored against
    pub fn angles(&self, extractor: &AngleExtractor, mode: BodyFocusMode) -> AngleSet {
        match &self.target {
            ReferenceTarget::Landmarks(frame) => extractor.extract(frame, mode),
            ReferenceTarget::Angles(angles) => angles.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPose {
    #[serde(default)]
    name: String,
    position: u32,
    #[serde(default)]
    landmarks: Option<Vec<IndexedLandmark>>,
    #[serde(default)]
    angles: Option<AngleSet>,
}

impl TryFrom<StoredPose> for ReferencePose {
    type Error = anyhow::Error;

    fn try_from(stored: StoredPose) -> Result<Self> {
        let target = match (stored.landmarks, stored.angles) {
            (Some(landmarks), None) => {
                let frame = LandmarkFrame::from_indexed(&landmarks).map_err(|index| {
                    anyhow::anyhow!("pose '{}': landmark index {} out of range", stored.name, index)
                })?;
                ReferenceTarget::Landmarks(frame)
            }
            (None, Some(angles)) => ReferenceTarget::Angles(angles),
            (Some(_), Some(_)) => bail!("pose '{}': has both landmarks and angles", stored.name),
            (None, None) => bail!("pose '{}': has neither landmarks nor angles", stored.name),
        };
        Ok(Self {
            name: stored.name,
            position: stored.position,
            target,
        })
    }
}

/// Ordered reference poses for one workout
#[derive(Debug, Clone, Default)]
pub struct WorkoutPlan {
    pub poses: Vec<ReferencePose>,
}

impl WorkoutPlan {
    /// Parses a plan and orders it by `position`
    pub fn from_json(json: &str) -> Result<Self> {
        let stored: Vec<StoredPose> = serde_json::from_str(json).context("Invalid plan JSON")?;
        let mut poses = stored
            .into_iter()
            .map(ReferencePose::try_from)
            .collect::<Result<Vec<_>>>()?;
        poses.sort_by_key(|p| p.position);
        Ok(Self { poses })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Failed to load plan {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}
