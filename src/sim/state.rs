//! Session state for one room's minigame
//!
//! A `RhythmSession` owns everything the engine mutates: notes, power-ups,
//! score, player and the outbound event queue. The host creates one per room
//! visit (or reuses one through `start`/`stop`).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::note::{self, Note, NoteKind};
use super::player::{Player, SceneBounds};
use super::powerup::{PowerUpKind, PowerUpState};
use super::registry::NoteRegistry;
use super::scoring::{Feedback, ScoreLedger};
use crate::tuning::Tuning;

/// Notifications for the presentation layer, drained once per frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted,
    SessionStopped { score: u64, max_combo: u32 },
    /// Attach a visual for this note id
    NoteSpawned { id: u32, kind: NoteKind, pos: Vec2 },
    /// Drop the visual for this note id
    NoteRemoved { id: u32 },
    /// Text popup for a resolved note
    Feedback(Feedback),
    /// Short burst at a caught note
    HitEffect { pos: Vec2 },
    /// Unguarded bomb catch
    ScreenShake,
    PowerUpChanged { kind: PowerUpKind },
    FreezeChanged { active: bool },
}

#[derive(Debug, Clone)]
pub struct RhythmSession {
    /// Seed the note RNG was created from
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub ledger: ScoreLedger,
    pub power: PowerUpState,
    pub notes: NoteRegistry,
    pub player: Player,
    /// Frames ticked since `start` (monotonic within a session)
    pub frame: u64,
    pub is_playing: bool,
    /// Pending notifications, oldest first
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl RhythmSession {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Session with custom balance. An invalid `Tuning` is replaced by the
    /// defaults (with a warning), same as a bad JSON override.
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let tuning = match tuning.validate() {
            Ok(()) => tuning,
            Err(e) => {
                log::warn!("Rejecting tuning, using defaults: {}", e);
                Tuning::default()
            }
        };
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            ledger: ScoreLedger::new(),
            power: PowerUpState::new(),
            notes: NoteRegistry::new(),
            player: Player::default(),
            frame: 0,
            is_playing: false,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Begin a fresh round: zero score and combo, no notes, no power-ups,
    /// player at the bottom middle of the stage
    pub fn start(&mut self, bounds: SceneBounds) {
        self.clear_notes();
        self.power.reset();
        self.ledger.reset();
        self.frame = 0;
        self.player = Player::new(Player::spawn_point(bounds));
        self.is_playing = true;
        self.events.push(GameEvent::SessionStarted);
        log::info!("Rhythm session started (seed {})", self.seed);
    }

    /// End the round. Clears notes and power-up state synchronously; the final
    /// score stays readable. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if !self.is_playing && self.notes.is_empty() && self.power == PowerUpState::default() {
            return;
        }
        self.is_playing = false;
        self.clear_notes();
        if self.power.is_powered() {
            self.events.push(GameEvent::PowerUpChanged {
                kind: PowerUpKind::Normal,
            });
        }
        if self.power.is_frozen() {
            self.events.push(GameEvent::FreezeChanged { active: false });
        }
        self.power.reset();
        self.events.push(GameEvent::SessionStopped {
            score: self.ledger.score,
            max_combo: self.ledger.max_combo,
        });
        log::info!(
            "Rhythm session stopped: score {} (max combo {})",
            self.ledger.score,
            self.ledger.max_combo
        );
    }

    /// Allocate a note id (unique for the lifetime of this session object)
    pub fn next_note_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Spawn a random note across a lane of the given width
    pub fn spawn_note(&mut self, lane_width: f32) -> u32 {
        let id = self.next_note_id();
        let note = note::generate(&mut self.rng, lane_width, id, &self.tuning);
        self.insert_note(note);
        id
    }

    /// Insert a prepared note (scripted spawns and tests)
    pub fn insert_note(&mut self, note: Note) {
        log::debug!(
            "Spawn #{} {:?} at x={:.0} speed={:.2}",
            note.id,
            note.kind,
            note.pos.x,
            note.fall_speed
        );
        self.events.push(GameEvent::NoteSpawned {
            id: note.id,
            kind: note.kind,
            pos: note.pos,
        });
        self.notes.spawn(note);
    }

    fn clear_notes(&mut self) {
        for id in self.notes.clear() {
            self.events.push(GameEvent::NoteRemoved { id });
        }
    }

    /// Hand pending events to the presentation layer
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn score(&self) -> u64 {
        self.ledger.score
    }

    pub fn combo(&self) -> u32 {
        self.ledger.combo
    }

    pub fn active_notes(&self) -> &[Note] {
        self.notes.as_slice()
    }

    pub fn power_up(&self) -> PowerUpKind {
        self.power.kind
    }

    pub fn freeze_factor(&self) -> f32 {
        self.power.freeze_factor
    }

    /// Move the player to an absolute position (host-driven input)
    pub fn set_player_pos(&mut self, pos: Vec2) {
        self.player.pos = pos;
    }
}
