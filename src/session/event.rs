use serde::Serialize;
use std::collections::BTreeMap;

use crate::tracker::Joint;

/// Output of the session controller, consumed by UI and persistence
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Emitted once per processed frame
    FrameScored {
        pose_index: usize,
        per_joint: BTreeMap<Joint, f32>,
        overall: f32,
        is_match: bool,
        hold_progress_percent: u32,
    },
    PoseCompleted {
        pose_index: usize,
        name: String,
        accuracy: u32,
    },
    NextPose {
        pose_index: usize,
        name: String,
    },
    SessionCompleted {
        per_pose_accuracy: Vec<u32>,
        average_accuracy: f32,
        duration_seconds: f32,
    },
    SessionCancelled {
        per_pose_accuracy: Vec<u32>,
    },
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::FrameScored { .. } => "frame_scored",
            Self::PoseCompleted { .. } => "pose_completed",
            Self::NextPose { .. } => "next_pose",
            Self::SessionCompleted { .. } => "session_completed",
            Self::SessionCancelled { .. } => "session_cancelled",
        }
    }
}
