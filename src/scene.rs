//! Lobby and room flow
//!
//! Walking into a door opens it, plays a disk-change transition, then loads
//! the room and starts its rhythm session. Leaving stops the session right
//! away and fades back to the lobby. Timing is polled with the frame clock
//! instead of chained timers.

use std::collections::BTreeSet;

use crate::sim::{RhythmSession, SceneBounds};

/// Door swing before the transition starts
pub const DOOR_OPEN_MS: f64 = 500.0;
/// Disk-change transition before the room loads
pub const ROOM_TRANSITION_MS: f64 = 2_000.0;
/// Fade back to the lobby
pub const LEAVE_TRANSITION_MS: f64 = 1_000.0;

/// A room behind one of the lobby doors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Room {
    pub id: u8,
    pub name: &'static str,
    /// Background video file under `/videos/`
    pub video: &'static str,
    /// Song title and performer
    pub answers: &'static [&'static str],
    /// Visual style tag
    pub style: &'static str,
}

pub const ROOMS: [Room; 6] = [
    Room {
        id: 1,
        name: "迷迭香",
        video: "迷迭香.mp4",
        answers: &["迷迭香", "周杰伦"],
        style: "jazz",
    },
    Room {
        id: 2,
        name: "龙卷风",
        video: "龙卷风.mp4",
        answers: &["龙卷风", "周杰伦"],
        style: "pop",
    },
    Room {
        id: 3,
        name: "月亮代表谁的心",
        video: "月亮代表谁的心.mp4",
        answers: &["月亮代表谁的心", "陶喆"],
        style: "rnb",
    },
    Room {
        id: 4,
        name: "千年等一回",
        video: "千年等一回.mp4",
        answers: &["千年等一回", "高胜美"],
        style: "classic-cn",
    },
    Room {
        id: 5,
        name: "一生所爱",
        video: "一生所爱.mp4",
        answers: &["一生所爱", "卢冠廷"],
        style: "hk",
    },
    Room {
        id: 6,
        name: "敢问路在何方",
        video: "敢问路在何方.mp4",
        answers: &["敢问路在何方", "蒋大为"],
        style: "folk",
    },
];

impl Room {
    pub fn by_id(id: u8) -> Option<&'static Room> {
        ROOMS.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePhase {
    Lobby,
    DoorOpening { room: u8, until_ms: f64 },
    Transitioning { room: u8, until_ms: f64 },
    InRoom { room: u8 },
    Leaving { until_ms: f64 },
}

/// Something the presentation layer should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    DoorOpened { room: u8 },
    TransitionStarted { room: u8 },
    RoomLoaded { room: u8 },
    LeftRoom { room: u8 },
    LobbyShown,
}

#[derive(Debug, Clone)]
pub struct SceneFlow {
    pub phase: ScenePhase,
    pub visited: BTreeSet<u8>,
}

impl Default for SceneFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneFlow {
    pub fn new() -> Self {
        Self {
            phase: ScenePhase::Lobby,
            visited: BTreeSet::new(),
        }
    }

    /// Door or room transition in progress (gameplay input is ignored)
    pub fn is_transitioning(&self) -> bool {
        matches!(
            self.phase,
            ScenePhase::DoorOpening { .. } | ScenePhase::Transitioning { .. } | ScenePhase::Leaving { .. }
        )
    }

    pub fn current_room(&self) -> Option<&'static Room> {
        match self.phase {
            ScenePhase::InRoom { room } => Room::by_id(room),
            _ => None,
        }
    }

    /// Start opening a door. Ignored unless idle in the lobby.
    pub fn enter_room(&mut self, room: u8, now_ms: f64) -> Option<SceneEvent> {
        if self.phase != ScenePhase::Lobby {
            return None;
        }
        if Room::by_id(room).is_none() {
            log::warn!("No room with id {}", room);
            return None;
        }
        self.phase = ScenePhase::DoorOpening {
            room,
            until_ms: now_ms + DOOR_OPEN_MS,
        };
        log::info!("Opening door {}", room);
        Some(SceneEvent::DoorOpened { room })
    }

    /// Leave the current room. The session stops immediately.
    pub fn leave_room(&mut self, now_ms: f64, session: &mut RhythmSession) -> Option<SceneEvent> {
        let ScenePhase::InRoom { room } = self.phase else {
            return None;
        };
        session.stop();
        self.phase = ScenePhase::Leaving {
            until_ms: now_ms + LEAVE_TRANSITION_MS,
        };
        log::info!("Leaving room {}", room);
        Some(SceneEvent::LeftRoom { room })
    }

    /// Advance timed transitions; starts the session once a room has loaded
    pub fn update(
        &mut self,
        now_ms: f64,
        session: &mut RhythmSession,
        bounds: SceneBounds,
    ) -> Option<SceneEvent> {
        match self.phase {
            ScenePhase::DoorOpening { room, until_ms } if now_ms >= until_ms => {
                self.phase = ScenePhase::Transitioning {
                    room,
                    until_ms: now_ms + ROOM_TRANSITION_MS,
                };
                Some(SceneEvent::TransitionStarted { room })
            }
            ScenePhase::Transitioning { room, until_ms } if now_ms >= until_ms => {
                self.phase = ScenePhase::InRoom { room };
                self.visited.insert(room);
                session.start(bounds);
                log::info!("Entered room {}", room);
                Some(SceneEvent::RoomLoaded { room })
            }
            ScenePhase::Leaving { until_ms } if now_ms >= until_ms => {
                self.phase = ScenePhase::Lobby;
                Some(SceneEvent::LobbyShown)
            }
            _ => None,
        }
    }

    pub fn all_visited(&self) -> bool {
        ROOMS.iter().all(|r| self.visited.contains(&r.id))
    }
}
