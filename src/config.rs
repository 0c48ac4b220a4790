use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::tracker::BodyFocusMode;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub hold: HoldConfig,
}

/// Smoothing stages and landmark gating
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Landmark smoother window (frames)
    #[serde(default = "default_landmark_window")]
    pub landmark_smoothing_window: usize,
    /// Angle smoother window (frames)
    #[serde(default = "default_angle_window")]
    pub angle_smoothing_window: usize,
    /// Landmarks below this visibility count as absent
    #[serde(default = "default_min_visibility")]
    pub min_visibility: f32,
}

fn default_landmark_window() -> usize { 5 }
fn default_angle_window() -> usize { 5 }
fn default_min_visibility() -> f32 { 0.5 }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            landmark_smoothing_window: default_landmark_window(),
            angle_smoothing_window: default_angle_window(),
            min_visibility: default_min_visibility(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default)]
    pub body_focus_mode: BodyFocusMode,
    /// Angle difference (degrees) at which a joint scores 0
    #[serde(default = "default_tolerance_degrees")]
    pub tolerance_degrees: f32,
    /// Overall score needed to count as matching, in (0, 1]
    #[serde(default = "default_match_threshold")]
    pub match_threshold: f32,
}

fn default_tolerance_degrees() -> f32 { 60.0 }
fn default_match_threshold() -> f32 { 0.75 }

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            body_focus_mode: BodyFocusMode::default(),
            tolerance_degrees: default_tolerance_degrees(),
            match_threshold: default_match_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HoldConfig {
    #[serde(default = "default_required_hold_seconds")]
    pub required_hold_seconds: f32,
    /// Hold seconds gained per matching second
    #[serde(default = "default_increment_rate")]
    pub increment_rate: f32,
    /// Hold seconds lost per non-matching second
    #[serde(default = "default_decay_rate")]
    pub decay_rate: f32,
    /// Upper bound on a single frame's elapsed time
    #[serde(default = "default_max_dt_seconds")]
    pub max_dt_seconds: f32,
}

fn default_required_hold_seconds() -> f32 { 5.0 }
fn default_increment_rate() -> f32 { 1.0 }
fn default_decay_rate() -> f32 { 0.5 }
fn default_max_dt_seconds() -> f32 { 0.5 }

impl Default for HoldConfig {
    fn default() -> Self {
        Self {
            required_hold_seconds: default_required_hold_seconds(),
            increment_rate: default_increment_rate(),
            decay_rate: default_decay_rate(),
            max_dt_seconds: default_max_dt_seconds(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Falls back to defaults when the file is missing or unreadable
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("{:#}; using default config", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if p.landmark_smoothing_window == 0 {
            return Err(ConfigError::ZeroWindow("landmark_smoothing_window"));
        }
        if p.angle_smoothing_window == 0 {
            return Err(ConfigError::ZeroWindow("angle_smoothing_window"));
        }
        if !(0.0..=1.0).contains(&p.min_visibility) {
            return Err(ConfigError::OutOfRange {
                field: "min_visibility",
                value: p.min_visibility,
            });
        }

        let s = &self.scoring;
        if !(s.tolerance_degrees > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "tolerance_degrees",
                value: s.tolerance_degrees,
            });
        }
        if !(s.match_threshold > 0.0 && s.match_threshold <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "match_threshold",
                value: s.match_threshold,
            });
        }

        let h = &self.hold;
        for (field, value) in [
            ("required_hold_seconds", h.required_hold_seconds),
            ("increment_rate", h.increment_rate),
            ("max_dt_seconds", h.max_dt_seconds),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(h.decay_rate >= 0.0) {
            return Err(ConfigError::Negative {
                field: "decay_rate",
                value: h.decay_rate,
            });
        }
        // A single clamped tick must stay short of completion
        let step = h.max_dt_seconds * h.increment_rate;
        if step >= h.required_hold_seconds {
            return Err(ConfigError::SingleFrameCompletion {
                step,
                required: h.required_hold_seconds,
            });
        }
        Ok(())
    }
}
