//! Room results
//!
//! Two views of finished sessions, persisted together to LocalStorage: a top-10
//! board across all rooms, and a per-room record that is updated on every
//! session so a quiet room keeps its best even when the board is full.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single finished session on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Room the session was played in
    pub room: u8,
    pub max_combo: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Bests for one room. Score and combo are tracked separately, so they may
/// come from different sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomRecord {
    pub best_score: u64,
    pub best_combo: u32,
    /// Finished sessions in this room
    pub sessions: u32,
    /// Unix timestamp (ms) of the best score
    pub best_at: f64,
}

impl RoomRecord {
    fn record(&mut self, score: u64, max_combo: u32, timestamp: f64) -> bool {
        self.sessions += 1;
        self.best_combo = self.best_combo.max(max_combo);
        if score > self.best_score || self.sessions == 1 {
            self.best_score = score;
            self.best_at = timestamp;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct HighScores {
    /// Board, sorted by score descending
    pub entries: Vec<HighScoreEntry>,
    /// Per-room bests keyed by room id
    pub rooms: BTreeMap<u8, RoomRecord>,
}

impl HighScores {
    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "disco_catch_highscores";

    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a finished session. The room record is always updated; the
    /// return value is the board rank achieved (1-indexed) or None if it
    /// didn't make the board.
    pub fn add_score(
        &mut self,
        score: u64,
        room: u8,
        max_combo: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if self
            .rooms
            .entry(room)
            .or_default()
            .record(score, max_combo, timestamp)
        {
            log::info!("Room {} best is now {}", room, score);
        }

        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            room,
            max_combo,
            timestamp,
        };

        // Sorted descending by score; ties keep the older entry first
        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("New high score {} in room {} (rank {})", score, room, rank);
        Some(rank)
    }

    /// Bests recorded for a room, if it was ever finished
    pub fn best_for_room(&self, room: u8) -> Option<&RoomRecord> {
        self.rooms.get(&room)
    }

    /// Highest score on the board across all rooms
    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    /// Load high scores from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let Some(scores) = crate::storage::load::<HighScores>(Self::STORAGE_KEY) else {
            log::info!("No high scores found, starting fresh");
            return Self::new();
        };
        log::info!(
            "Loaded {} high scores, {} room records",
            scores.entries.len(),
            scores.rooms.len()
        );
        scores
    }

    /// Save high scores to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        if crate::storage::save(Self::STORAGE_KEY, self) {
            log::info!(
                "High scores saved ({} entries, {} rooms)",
                self.entries.len(),
                self.rooms.len()
            );
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::new()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}
