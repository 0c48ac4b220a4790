use serde::Serialize;
use std::time::Instant;

use super::event::SessionEvent;
use super::summary::{mean_accuracy, PoseResult, WorkoutSummary};
use crate::config::Config;
use crate::error::SessionError;
use crate::pose::{LandmarkFrame, ReferencePose};
use crate::tracker::{
    AngleExtractor, AngleSet, AngleSmoother, HoldAccumulator, HoldPhase, HoldState,
    LandmarkSmoother, SimilarityResult, SimilarityScorer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    NotStarted,
    Active,
    Completed,
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Walks an ordered list of reference poses, advancing each time a match has
/// been held for the configured duration.
///
/// Owns its whole pipeline (smoothing buffers and hold state); run one
/// controller per concurrent session.
pub struct SessionController {
    config: Config,
    state: SessionState,

    poses: Vec<ReferencePose>,
    reference_angles: Vec<AngleSet>,
    current_index: usize,
    per_pose_accuracy: Vec<u32>,
    pose_results: Vec<PoseResult>,

    started_at: Option<Instant>,
    ended_at: Option<Instant>,
    last_frame_at: Option<Instant>,
    pose_started_at: Option<Instant>,
    attempts: u32,

    landmark_smoother: LandmarkSmoother,
    extractor: AngleExtractor,
    angle_smoother: AngleSmoother,
    scorer: SimilarityScorer,
    hold: HoldAccumulator,
    last_result: SimilarityResult,
}

impl SessionController {
    pub fn new(config: Config) -> Self {
        Self {
            landmark_smoother: LandmarkSmoother::new(config.pipeline.landmark_smoothing_window),
            extractor: AngleExtractor::new(config.pipeline.min_visibility),
            angle_smoother: AngleSmoother::new(config.pipeline.angle_smoothing_window),
            scorer: SimilarityScorer::from_config(&config.scoring),
            hold: HoldAccumulator::from_config(&config.hold),
            config,
            state: SessionState::NotStarted,
            poses: Vec::new(),
            reference_angles: Vec::new(),
            current_index: 0,
            per_pose_accuracy: Vec::new(),
            pose_results: Vec::new(),
            started_at: None,
            ended_at: None,
            last_frame_at: None,
            pose_started_at: None,
            attempts: 0,
            last_result: SimilarityResult::empty(),
        }
    }

    /// Validates the configuration and begins the first pose
    pub fn start(&mut self, poses: Vec<ReferencePose>, now: Instant) -> Result<(), SessionError> {
        if self.state != SessionState::NotStarted {
            return Err(SessionError::AlreadyStarted);
        }
        if let Err(e) = self.config.validate() {
            tracing::warn!("session rejected: {}", e);
            return Err(e.into());
        }
        if poses.is_empty() {
            return Err(SessionError::NoPoses);
        }

        let mode = self.config.scoring.body_focus_mode;
        self.reference_angles = poses
            .iter()
            .map(|pose| {
                let angles = pose.angles(&self.extractor, mode);
                if angles.is_empty() {
                    tracing::warn!("reference pose '{}' has no measurable joints in {} mode", pose.name, mode);
                }
                angles
            })
            .collect();
        self.poses = poses;
        self.current_index = 0;
        self.started_at = Some(now);
        self.pose_started_at = Some(now);
        self.state = SessionState::Active;

        tracing::info!(
            "session started: {} poses, {} body, hold {:.1}s",
            self.poses.len(),
            mode,
            self.config.hold.required_hold_seconds
        );
        Ok(())
    }

    /// Runs one frame through the pipeline. `None` means the detector found no body.
    /// Frames delivered outside the active state are ignored.
    pub fn on_frame(&mut self, frame: Option<&LandmarkFrame>, now: Instant) -> Vec<SessionEvent> {
        if self.state != SessionState::Active {
            return Vec::new();
        }
        self.last_frame_at = Some(now);
        let mode = self.config.scoring.body_focus_mode;

        let current = match frame {
            Some(frame) => {
                let smoothed = self.landmark_smoother.push(frame.clone());
                let angles = self.extractor.extract(&smoothed, mode);
                self.angle_smoother.push(angles)
            }
            None => {
                // Lost the body: the next detection re-seeds both windows
                self.landmark_smoother.reset();
                self.angle_smoother.reset();
                AngleSet::new()
            }
        };

        let result = self
            .scorer
            .score(&self.reference_angles[self.current_index], &current, mode);

        let was_idle = self.hold.state().phase == HoldPhase::Idle;
        let hold = self.hold.tick(result.is_match, now);
        if was_idle && hold.phase != HoldPhase::Idle {
            self.attempts += 1;
        }

        let mut events = vec![SessionEvent::FrameScored {
            pose_index: self.current_index,
            per_joint: result.per_joint.clone(),
            overall: result.overall,
            is_match: result.is_match,
            hold_progress_percent: hold.progress_percent,
        }];

        if hold.is_complete() {
            self.complete_pose(result.accuracy_percent(), now, &mut events);
        }
        self.last_result = result;
        events
    }

    fn complete_pose(&mut self, accuracy: u32, now: Instant, events: &mut Vec<SessionEvent>) {
        let index = self.current_index;
        let name = self.poses[index].name.clone();
        let hold_seconds = self
            .pose_started_at
            .map_or(0.0, |t| now.saturating_duration_since(t).as_secs_f32());

        self.per_pose_accuracy.push(accuracy);
        self.pose_results.push(PoseResult {
            name: name.clone(),
            accuracy,
            hold_seconds,
            attempts: self.attempts.max(1),
        });
        tracing::debug!("pose {} '{}' completed: {}% after {:.1}s", index, name, accuracy, hold_seconds);
        events.push(SessionEvent::PoseCompleted {
            pose_index: index,
            name,
            accuracy,
        });

        if index + 1 < self.poses.len() {
            self.current_index = index + 1;
            self.pose_started_at = Some(now);
            self.attempts = 0;
            self.hold.reset();
            let next = self.poses[self.current_index].name.clone();
            tracing::debug!("advancing to pose {} '{}'", self.current_index, next);
            events.push(SessionEvent::NextPose {
                pose_index: self.current_index,
                name: next,
            });
        } else {
            self.state = SessionState::Completed;
            self.ended_at = Some(now);
            let duration_seconds = self.elapsed_seconds();
            let average_accuracy = mean_accuracy(&self.per_pose_accuracy);
            tracing::info!(
                "session completed: average {:.1}% in {:.1}s",
                average_accuracy,
                duration_seconds
            );
            events.push(SessionEvent::SessionCompleted {
                per_pose_accuracy: self.per_pose_accuracy.clone(),
                average_accuracy,
                duration_seconds,
            });
        }
    }

    /// Stops the session. Returns `None` if it had already ended.
    pub fn cancel(&mut self, now: Instant) -> Option<SessionEvent> {
        if self.state.is_terminal() {
            return None;
        }
        self.state = SessionState::Cancelled;
        self.ended_at = Some(now);
        tracing::info!(
            "session cancelled after {}/{} poses",
            self.per_pose_accuracy.len(),
            self.poses.len()
        );
        Some(SessionEvent::SessionCancelled {
            per_pose_accuracy: self.per_pose_accuracy.clone(),
        })
    }

    fn elapsed_seconds(&self) -> f32 {
        match (self.started_at, self.ended_at.or(self.last_frame_at)) {
            (Some(start), Some(end)) => end.saturating_duration_since(start).as_secs_f32(),
            _ => 0.0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_pose(&self) -> Option<&ReferencePose> {
        match self.state {
            SessionState::Active => self.poses.get(self.current_index),
            _ => None,
        }
    }

    pub fn per_pose_accuracy(&self) -> &[u32] {
        &self.per_pose_accuracy
    }

    pub fn last_result(&self) -> &SimilarityResult {
        &self.last_result
    }

    pub fn hold_state(&self) -> HoldState {
        self.hold.state()
    }

    /// `None` until the session has started
    pub fn summary(&self) -> Option<WorkoutSummary> {
        if self.state == SessionState::NotStarted {
            return None;
        }
        Some(WorkoutSummary::new(
            self.state == SessionState::Completed,
            self.poses.len(),
            self.elapsed_seconds(),
            self.config.scoring.body_focus_mode,
            self.pose_results.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::tracker::Joint;
    use std::time::Duration;

    fn at(t0: Instant, secs: f32) -> Instant {
        t0 + Duration::from_secs_f32(secs)
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.pipeline.landmark_smoothing_window = 1;
        config.pipeline.angle_smoothing_window = 1;
        config.hold.required_hold_seconds = 1.0;
        config.hold.max_dt_seconds = 0.5;
        config
    }

    /// Reference pose scored by angles only; frames are built to match it
    fn pose(name: &str) -> ReferencePose {
        let angles: AngleSet = [(Joint::LeftKnee, 180.0)].into_iter().collect();
        ReferencePose::from_angles(name, 0, angles)
    }

    /// Straight left leg: hip, knee, ankle on one vertical line
    fn straight_leg() -> LandmarkFrame {
        use crate::pose::{Landmark, LandmarkIndex};
        let mut f = LandmarkFrame::empty();
        f.set(LandmarkIndex::LeftHip, Landmark::new(0.5, 0.5, 0.0, 1.0));
        f.set(LandmarkIndex::LeftKnee, Landmark::new(0.5, 0.7, 0.0, 1.0));
        f.set(LandmarkIndex::LeftAnkle, Landmark::new(0.5, 0.9, 0.0, 1.0));
        f
    }

    #[test]
    fn test_start_rejects_invalid_config() {
        let mut config = test_config();
        config.scoring.match_threshold = 0.0;
        let mut session = SessionController::new(config);
        let err = session.start(vec![pose("a")], Instant::now()).unwrap_err();
        assert!(matches!(err, SessionError::Config(ConfigError::OutOfRange { .. })));
        assert_eq!(session.state(), SessionState::NotStarted);
        assert!(session.on_frame(Some(&straight_leg()), Instant::now()).is_empty());
    }

    #[test]
    fn test_start_rejects_empty_plan() {
        let mut session = SessionController::new(test_config());
        assert_eq!(session.start(Vec::new(), Instant::now()), Err(SessionError::NoPoses));
    }

    #[test]
    fn test_start_twice() {
        let mut session = SessionController::new(test_config());
        let t0 = Instant::now();
        session.start(vec![pose("a")], t0).unwrap();
        assert_eq!(session.start(vec![pose("a")], t0), Err(SessionError::AlreadyStarted));
    }

    #[test]
    fn test_frame_scored_every_frame() {
        let mut session = SessionController::new(test_config());
        let t0 = Instant::now();
        session.start(vec![pose("a")], t0).unwrap();
        let events = session.on_frame(Some(&straight_leg()), t0);
        assert_eq!(events.len(), 1);
        match &events[0] {
            SessionEvent::FrameScored { overall, is_match, .. } => {
                assert!(*overall > 0.99);
                assert!(*is_match);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_no_detection_scores_zero_and_decays() {
        let mut session = SessionController::new(test_config());
        let t0 = Instant::now();
        session.start(vec![pose("a")], t0).unwrap();
        session.on_frame(Some(&straight_leg()), t0);
        session.on_frame(Some(&straight_leg()), at(t0, 0.5));
        let before = session.hold_state().cumulative_seconds;
        assert!(before > 0.0);

        let events = session.on_frame(None, at(t0, 0.75));
        match &events[0] {
            SessionEvent::FrameScored { overall, is_match, per_joint, .. } => {
                assert_eq!(*overall, 0.0);
                assert!(!is_match);
                assert!(per_joint.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        let after = session.hold_state().cumulative_seconds;
        assert!(after < before);
        assert!(after > 0.0);
    }

    #[test]
    fn test_single_pose_completes_session() {
        let mut session = SessionController::new(test_config());
        let t0 = Instant::now();
        session.start(vec![pose("only")], t0).unwrap();
        let mut all = Vec::new();
        for i in 0..=2 {
            all.extend(session.on_frame(Some(&straight_leg()), at(t0, i as f32 * 0.5)));
        }
        let names: Vec<&str> = all.iter().map(|e| e.name()).collect();
        assert_eq!(names, ["frame_scored", "frame_scored", "frame_scored", "pose_completed", "session_completed"]);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.per_pose_accuracy(), &[100]);
        assert!(session.current_pose().is_none());

        // Terminal: further frames are no-ops
        assert!(session.on_frame(Some(&straight_leg()), at(t0, 1.5)).is_empty());
        assert!(session.cancel(at(t0, 1.5)).is_none());
    }

    #[test]
    fn test_cancel_preserves_results() {
        let mut session = SessionController::new(test_config());
        let t0 = Instant::now();
        session.start(vec![pose("a"), pose("b")], t0).unwrap();
        for i in 0..=2 {
            session.on_frame(Some(&straight_leg()), at(t0, i as f32 * 0.5));
        }
        assert_eq!(session.current_index(), 1);

        let event = session.cancel(at(t0, 2.0)).unwrap();
        assert_eq!(event, SessionEvent::SessionCancelled { per_pose_accuracy: vec![100] });
        assert_eq!(session.state(), SessionState::Cancelled);
        assert!(session.on_frame(Some(&straight_leg()), at(t0, 2.5)).is_empty());

        let summary = session.summary().unwrap();
        assert!(!summary.completed);
        assert_eq!(summary.poses_completed, 1);
        assert_eq!(summary.total_poses, 2);
        assert!((summary.duration_seconds - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_cancel_before_start() {
        let mut session = SessionController::new(test_config());
        let event = session.cancel(Instant::now()).unwrap();
        assert_eq!(event, SessionEvent::SessionCancelled { per_pose_accuracy: vec![] });
        assert!(session.start(vec![pose("a")], Instant::now()).is_err());
    }

    #[test]
    fn test_attempts_counted() {
        let mut config = test_config();
        config.hold.decay_rate = 4.0;
        let mut session = SessionController::new(config);
        let t0 = Instant::now();
        session.start(vec![pose("a")], t0).unwrap();

        // First attempt: match, then lose it long enough to decay to zero
        session.on_frame(Some(&straight_leg()), at(t0, 0.0));
        session.on_frame(Some(&straight_leg()), at(t0, 0.25));
        session.on_frame(None, at(t0, 0.5));
        assert_eq!(session.hold_state().phase, HoldPhase::Idle);

        // Second attempt holds through
        for i in 0..=4 {
            session.on_frame(Some(&straight_leg()), at(t0, 1.0 + i as f32 * 0.25));
        }
        assert_eq!(session.state(), SessionState::Completed);
        let summary = session.summary().unwrap();
        assert_eq!(summary.pose_results[0].attempts, 2);
        assert!((summary.pose_results[0].hold_seconds - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_summary_before_start() {
        let session = SessionController::new(test_config());
        assert!(session.summary().is_none());
    }
}
