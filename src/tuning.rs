//! Data-driven game balance
//!
//! Timing and speed knobs for the rhythm engine. Defaults reproduce the
//! shipped balance; a JSON override can be loaded for playtesting.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning override
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("malformed tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Engine balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Frames between note spawns (spawn when `frame % interval == 0`)
    pub spawn_interval_frames: u64,
    /// Base fall speed, units per frame
    pub base_fall_speed: f32,
    /// Upper bound (exclusive) of the random speed jitter
    pub speed_jitter: f32,
    /// Spawn height (above the visible area)
    pub spawn_y: f32,
    /// How long the mushroom growth lasts
    pub big_duration_ms: f64,
    /// How long star invincibility lasts
    pub star_duration_ms: f64,
    /// How long an ice slow-down lasts
    pub freeze_duration_ms: f64,
    /// Fall-speed multiplier while frozen
    pub freeze_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spawn_interval_frames: 100,
            base_fall_speed: 3.0,
            speed_jitter: 2.0,
            spawn_y: -50.0,
            big_duration_ms: 15_000.0,
            star_duration_ms: 8_000.0,
            freeze_duration_ms: 5_000.0,
            freeze_factor: 0.5,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse an override, falling back to defaults on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => tuning,
            Err(e) => {
                log::warn!("Ignoring tuning override: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        if self.spawn_interval_frames == 0 {
            return Err(TuningError::Invalid {
                field: "spawn_interval_frames",
                reason: "must be at least 1",
            });
        }
        if !(self.base_fall_speed >= 0.0) {
            return Err(TuningError::Invalid {
                field: "base_fall_speed",
                reason: "must be non-negative",
            });
        }
        if !(self.speed_jitter >= 0.0) {
            return Err(TuningError::Invalid {
                field: "speed_jitter",
                reason: "must be non-negative",
            });
        }
        if !(self.freeze_factor > 0.0 && self.freeze_factor <= 1.0) {
            return Err(TuningError::Invalid {
                field: "freeze_factor",
                reason: "must be in (0, 1]",
            });
        }
        let durations = [
            ("big_duration_ms", self.big_duration_ms),
            ("star_duration_ms", self.star_duration_ms),
            ("freeze_duration_ms", self.freeze_duration_ms),
        ];
        for (field, value) in durations {
            if !(value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be non-negative",
                });
            }
        }
        Ok(())
    }
}
