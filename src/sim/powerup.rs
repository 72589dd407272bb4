//! Power-up state machine
//!
//! The primary modifier is exclusive: normal, big (wider hitbox) or star
//! (invincible, double points). Freeze is an independent slow-fall timer that
//! can overlap either of them. Expiry is polled once per tick.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Primary power-up modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PowerUpKind {
    #[default]
    Normal,
    Big,
    Star,
}

impl PowerUpKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PowerUpKind::Normal => "normal",
            PowerUpKind::Big => "big",
            PowerUpKind::Star => "star",
        }
    }
}

/// What changed during an expiry poll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Expiry {
    /// The primary modifier timed out and reverted to normal
    pub power_reverted: bool,
    /// The freeze timed out and fall speed is back to 1x
    pub freeze_ended: bool,
}

/// Primary modifier plus the freeze timer. All times are absolute
/// milliseconds on the host clock passed to `tick`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUpState {
    pub kind: PowerUpKind,
    /// Absolute time (ms) when `kind` reverts; meaningless while normal
    pub expires_at_ms: f64,
    /// Fall-speed multiplier (1.0 unless frozen)
    pub freeze_factor: f32,
    /// Absolute time (ms) when the freeze ends
    pub freeze_expires_at_ms: f64,
}

impl Default for PowerUpState {
    fn default() -> Self {
        Self {
            kind: PowerUpKind::Normal,
            expires_at_ms: 0.0,
            freeze_factor: 1.0,
            freeze_expires_at_ms: 0.0,
        }
    }
}

impl PowerUpState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the primary modifier. Entering big clears star and vice versa.
    pub fn set(&mut self, kind: PowerUpKind, now_ms: f64, tuning: &Tuning) {
        self.kind = kind;
        self.expires_at_ms = match kind {
            PowerUpKind::Normal => 0.0,
            PowerUpKind::Big => now_ms + tuning.big_duration_ms,
            PowerUpKind::Star => now_ms + tuning.star_duration_ms,
        };
    }

    /// Start (or re-extend) the slow-fall timer. Never stacks.
    pub fn freeze(&mut self, now_ms: f64, tuning: &Tuning) {
        self.freeze_factor = tuning.freeze_factor;
        self.freeze_expires_at_ms = now_ms + tuning.freeze_duration_ms;
    }

    /// Drop the primary modifier immediately
    pub fn power_down(&mut self) {
        self.kind = PowerUpKind::Normal;
        self.expires_at_ms = 0.0;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Revert anything whose timer has strictly passed
    pub fn expire(&mut self, now_ms: f64) -> Expiry {
        let mut expiry = Expiry::default();
        if self.kind != PowerUpKind::Normal && now_ms > self.expires_at_ms {
            self.power_down();
            expiry.power_reverted = true;
        }
        if self.freeze_factor < 1.0 && now_ms > self.freeze_expires_at_ms {
            self.freeze_factor = 1.0;
            expiry.freeze_ended = true;
        }
        expiry
    }

    /// Big or star is active (freeze alone doesn't count)
    pub fn is_powered(&self) -> bool {
        self.kind != PowerUpKind::Normal
    }

    pub fn is_frozen(&self) -> bool {
        self.freeze_factor < 1.0
    }

    /// Horizontal hitbox inset per side
    pub fn hitbox_inset(&self) -> f32 {
        match self.kind {
            PowerUpKind::Big => HITBOX_INSET_BIG,
            PowerUpKind::Normal | PowerUpKind::Star => HITBOX_INSET,
        }
    }

    /// Multiplier applied to base catch points
    pub fn score_multiplier(&self) -> u64 {
        match self.kind {
            PowerUpKind::Star => STAR_MULTIPLIER,
            PowerUpKind::Normal | PowerUpKind::Big => 1,
        }
    }

    /// Milliseconds left on the primary modifier (0 when normal)
    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        if self.is_powered() {
            (self.expires_at_ms - now_ms).max(0.0)
        } else {
            0.0
        }
    }
}
