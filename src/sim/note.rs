//! Falling notes and the random note generator
//!
//! Every spawn tick draws one uniform value and classifies it against a fixed
//! cumulative probability table, then draws fall-speed jitter and a lane x.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::Tuning;

/// Note types, from collectible to hazard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteKind {
    /// Plain music note
    Melody,
    /// Star symbol (scores like a melody note)
    StarIcon,
    /// Worth triple points
    Coin,
    /// Hazard: catching it hurts, letting it fall is safe
    Bomb,
    /// Grants the big power-up
    Mushroom,
    /// Grants star invincibility
    StarPower,
    /// Slows every falling note for a while
    Ice,
}

/// Cumulative classification table, checked in order
const KIND_THRESHOLDS: [(f32, NoteKind); 6] = [
    (0.03, NoteKind::Ice),
    (0.08, NoteKind::Mushroom),
    (0.13, NoteKind::StarPower),
    (0.20, NoteKind::Bomb),
    (0.30, NoteKind::Coin),
    (0.65, NoteKind::StarIcon),
];

impl NoteKind {
    /// Every kind, in declaration order
    pub const ALL: [NoteKind; 7] = [
        NoteKind::Melody,
        NoteKind::StarIcon,
        NoteKind::Coin,
        NoteKind::Bomb,
        NoteKind::Mushroom,
        NoteKind::StarPower,
        NoteKind::Ice,
    ];

    /// Classify a uniform draw in [0, 1)
    pub fn from_roll(roll: f32) -> Self {
        KIND_THRESHOLDS
            .iter()
            .find(|(threshold, _)| roll < *threshold)
            .map(|&(_, kind)| kind)
            .unwrap_or(NoteKind::Melody)
    }

    /// Extra fall speed on top of the base speed
    pub fn speed_bonus(self) -> f32 {
        match self {
            NoteKind::Ice => 1.0,
            NoteKind::Mushroom | NoteKind::Coin => 2.0,
            NoteKind::StarPower => 3.0,
            NoteKind::Bomb | NoteKind::Melody | NoteKind::StarIcon => 0.0,
        }
    }

    /// Declared spawn probability (for diagnostics and tests)
    pub fn probability(self) -> f32 {
        match self {
            NoteKind::Ice => 0.03,
            NoteKind::Mushroom => 0.05,
            NoteKind::StarPower => 0.05,
            NoteKind::Bomb => 0.07,
            NoteKind::Coin => 0.10,
            NoteKind::StarIcon => 0.35,
            NoteKind::Melody => 0.35,
        }
    }

    /// Catching it unguarded costs points and the combo
    pub fn is_hazard(self) -> bool {
        self == NoteKind::Bomb
    }

    /// Glyph used by the presentation layer
    pub fn symbol(self) -> &'static str {
        match self {
            NoteKind::Melody => "🎵",
            NoteKind::StarIcon => "★",
            NoteKind::Coin => "🪙",
            NoteKind::Bomb => "💣",
            NoteKind::Mushroom => "🍄",
            NoteKind::StarPower => "🌟",
            NoteKind::Ice => "❄",
        }
    }

    /// CSS class suffix used by the presentation layer
    pub fn as_str(self) -> &'static str {
        match self {
            NoteKind::Melody => "melody",
            NoteKind::StarIcon => "star-icon",
            NoteKind::Coin => "coin",
            NoteKind::Bomb => "bomb",
            NoteKind::Mushroom => "mushroom",
            NoteKind::StarPower => "star-power",
            NoteKind::Ice => "ice",
        }
    }
}

/// A falling note
///
/// Lives in the session's [`NoteRegistry`](super::registry::NoteRegistry) from
/// spawn until its terminal event (caught or fell past the miss line). The
/// box is always `NOTE_SIZE` square.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Session-unique id, the key the presentation layer tracks visuals by
    pub id: u32,
    pub kind: NoteKind,
    /// Top-left corner in scene coordinates
    pub pos: Vec2,
    /// Units per frame before the freeze factor is applied (never negative)
    pub fall_speed: f32,
}

impl Note {
    /// Create a note. Spawning normally goes through [`generate`].
    pub fn new(id: u32, kind: NoteKind, pos: Vec2, fall_speed: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            fall_speed,
        }
    }

    /// Advance one frame. A freeze factor of 0.5 halves the fall distance.
    #[inline]
    pub fn fall(&mut self, freeze_factor: f32) {
        self.pos.y += self.fall_speed * freeze_factor;
    }

    /// Center point (where hit effects are anchored)
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(NOTE_SIZE / 2.0)
    }
}

/// Spawn x range for a lane: `[LANE_PADDING, LANE_PADDING + span)`
pub fn spawn_span(lane_width: f32) -> f32 {
    (lane_width - LANE_MARGIN).max(0.0)
}

/// Build a random note for a lane of the given width
pub fn generate<R: Rng + ?Sized>(rng: &mut R, lane_width: f32, id: u32, tuning: &Tuning) -> Note {
    let kind = NoteKind::from_roll(rng.random::<f32>());
    let jitter = rng.random::<f32>() * tuning.speed_jitter;
    let fall_speed = (tuning.base_fall_speed + kind.speed_bonus() + jitter).max(0.0);
    let x = rng.random::<f32>() * spawn_span(lane_width) + LANE_PADDING;

    Note::new(id, kind, Vec2::new(x, tuning.spawn_y), fall_speed)
}
