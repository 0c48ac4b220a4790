use serde::Serialize;

use crate::tracker::BodyFocusMode;

/// Poses scored below this accuracy are flagged for extra practice
pub const CHALLENGING_ACCURACY: u32 = 60;

/// Outcome of one completed reference pose
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoseResult {
    pub name: String,
    /// round(overall * 100) on the frame the hold completed
    pub accuracy: u32,
    /// Time from the pose becoming current to its hold completing
    pub hold_seconds: f32,
    /// Number of holds started on this pose, including the successful one
    pub attempts: u32,
}

/// Session record handed to the persistence side
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub completed: bool,
    pub poses_completed: usize,
    pub total_poses: usize,
    pub average_accuracy: f32,
    pub duration_seconds: f32,
    pub body_focus_mode: BodyFocusMode,
    pub pose_results: Vec<PoseResult>,
    pub challenging_poses: Vec<String>,
}

impl WorkoutSummary {
    pub fn new(
        completed: bool,
        total_poses: usize,
        duration_seconds: f32,
        body_focus_mode: BodyFocusMode,
        pose_results: Vec<PoseResult>,
    ) -> Self {
        let accuracies: Vec<u32> = pose_results.iter().map(|r| r.accuracy).collect();
        let mut challenging_poses: Vec<String> = Vec::new();
        for result in &pose_results {
            if result.accuracy < CHALLENGING_ACCURACY && !challenging_poses.contains(&result.name) {
                challenging_poses.push(result.name.clone());
            }
        }
        Self {
            completed,
            poses_completed: pose_results.len(),
            total_poses,
            average_accuracy: mean_accuracy(&accuracies),
            duration_seconds,
            body_focus_mode,
            pose_results,
            challenging_poses,
        }
    }
}

/// Mean of per-pose accuracies, 0 for an empty list
pub fn mean_accuracy(accuracies: &[u32]) -> f32 {
    if accuracies.is_empty() {
        return 0.0;
    }
    accuracies.iter().map(|&a| a as f32).sum::<f32>() / accuracies.len() as f32
}
