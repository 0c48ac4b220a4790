use serde::Serialize;
use std::time::Instant;

use crate::config::HoldConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HoldPhase {
    Idle,
    Accumulating,
    /// Reported on the single tick that reached the required duration
    Complete,
}

/// Snapshot returned by every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HoldState {
    pub phase: HoldPhase,
    pub cumulative_seconds: f32,
    pub required_seconds: f32,
    /// 100 on the completing tick, otherwise round(100 * cumulative / required)
    pub progress_percent: u32,
    /// Time of the last tick; `None` before the first tick and after a completion
    #[serde(skip)]
    pub last_timestamp: Option<Instant>,
}

impl HoldState {
    pub fn is_complete(&self) -> bool {
        self.phase == HoldPhase::Complete
    }
}

/// Integrates match decisions over wall-clock time toward a required hold
pub struct HoldAccumulator {
    required_seconds: f32,
    increment_rate: f32,
    decay_rate: f32,
    max_dt: f32,
    cumulative_seconds: f32,
    last_time: Option<Instant>,
    phase: HoldPhase,
}

impl HoldAccumulator {
    pub fn new(required_seconds: f32, increment_rate: f32, decay_rate: f32, max_dt: f32) -> Self {
        Self {
            required_seconds,
            increment_rate,
            decay_rate,
            max_dt,
            cumulative_seconds: 0.0,
            last_time: None,
            phase: HoldPhase::Idle,
        }
    }

    pub fn from_config(config: &HoldConfig) -> Self {
        Self::new(
            config.required_hold_seconds,
            config.increment_rate,
            config.decay_rate,
            config.max_dt_seconds,
        )
    }

    pub fn tick(&mut self, is_match: bool, now: Instant) -> HoldState {
        // First tick (or first after a completion) only anchors the clock
        let dt = match self.last_time {
            Some(last) => {
                let raw = now.saturating_duration_since(last).as_secs_f32();
                if raw > self.max_dt {
                    tracing::warn!(
                        "frame gap of {:.3}s clamped to {:.3}s",
                        raw,
                        self.max_dt
                    );
                    self.max_dt
                } else {
                    raw
                }
            }
            None => 0.0,
        };
        self.last_time = Some(now);

        if is_match {
            self.cumulative_seconds += dt * self.increment_rate;
            self.phase = HoldPhase::Accumulating;
        } else {
            self.cumulative_seconds = (self.cumulative_seconds - dt * self.decay_rate).max(0.0);
            if self.cumulative_seconds <= 0.0 {
                self.phase = HoldPhase::Idle;
            }
        }

        if self.cumulative_seconds >= self.required_seconds {
            self.cumulative_seconds = 0.0;
            self.last_time = None;
            self.phase = HoldPhase::Idle;
            return HoldState {
                phase: HoldPhase::Complete,
                cumulative_seconds: 0.0,
                required_seconds: self.required_seconds,
                progress_percent: 100,
                last_timestamp: None,
            };
        }

        self.state()
    }

    /// Current state without advancing time
    pub fn state(&self) -> HoldState {
        let ratio = (self.cumulative_seconds / self.required_seconds).clamp(0.0, 1.0);
        HoldState {
            phase: self.phase,
            cumulative_seconds: self.cumulative_seconds,
            required_seconds: self.required_seconds,
            progress_percent: (ratio * 100.0).round() as u32,
            last_timestamp: self.last_time,
        }
    }

    pub fn reset(&mut self) {
        self.cumulative_seconds = 0.0;
        self.last_time = None;
        self.phase = HoldPhase::Idle;
    }
}
