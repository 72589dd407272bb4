//! Disco Catch - a disco lobby with a falling-note catch minigame in every room
//!
//! Core modules:
//! - `sim`: Rhythm engine (note spawning, collisions, power-ups, scoring)
//! - `scene`: Lobby/room transition flow and the room catalog
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences
//! - `highscores`: Per-room best results
//! - `audio`: Feedback sounds (Web Audio on wasm32)

pub mod audio;
pub mod highscores;
pub mod scene;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
mod storage;
pub mod tuning;

pub use highscores::{HighScores, RoomRecord};
pub use scene::{Room, ROOMS, SceneFlow, ScenePhase};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Player sprite edge length
    pub const PLAYER_SIZE: f32 = 48.0;
    /// Player movement per frame per axis
    pub const PLAYER_SPEED: f32 = 10.0;
    /// Inside a room the player is confined to the bottom 40% of the stage
    pub const ROOM_FLOOR_RATIO: f32 = 0.60;

    /// Horizontal hitbox inset per side (normal and star)
    pub const HITBOX_INSET: f32 = 5.0;
    /// Horizontal hitbox inset per side while big (negative = grows 15 per side)
    pub const HITBOX_INSET_BIG: f32 = -15.0;
    /// Top of the player that never catches anything ("catch with lower body")
    pub const HITBOX_HEAD_CLEARANCE: f32 = 20.0;

    /// Note edge length
    pub const NOTE_SIZE: f32 = 40.0;
    /// Notes spawn this far inside either lane edge
    pub const LANE_PADDING: f32 = 25.0;
    /// Total horizontal span removed from the lane when picking spawn x
    pub const LANE_MARGIN: f32 = 75.0;

    /// Points for an ordinary catch
    pub const CATCH_POINTS: u64 = 100;
    /// Points for a coin catch
    pub const COIN_POINTS: u64 = 300;
    /// Extra points per combo step
    pub const COMBO_BONUS: u64 = 10;
    /// Reward for smashing a bomb while invincible
    pub const BOMB_DESTROY_POINTS: u64 = 200;
    /// Penalty for catching a bomb unguarded
    pub const BOMB_PENALTY: u64 = 500;
    /// Score multiplier while star power is active
    pub const STAR_MULTIPLIER: u64 = 2;
}
