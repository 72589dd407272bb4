//! Rhythm catch engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Externally driven, one `tick` per display frame
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod note;
pub mod player;
pub mod powerup;
pub mod registry;
pub mod scoring;
pub mod state;
pub mod tick;

pub use collision::{Rect, check as check_collision, note_hitbox, player_hitbox};
pub use note::{Note, NoteKind, generate as generate_note};
pub use player::{Player, SceneBounds};
pub use powerup::{Expiry, PowerUpKind, PowerUpState};
pub use registry::NoteRegistry;
pub use scoring::{ComboAction, Feedback, PowerUpEffect, Resolution, ScoreLedger, resolve};
pub use state::{GameEvent, RhythmSession};
pub use tick::{TickInput, autopilot_direction, resolve_note, tick};
