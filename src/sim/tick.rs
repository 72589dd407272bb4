//! Per-frame update
//!
//! Driven once per display refresh by the host. Spawning is frame-count based,
//! so the real-time spawn cadence follows the achieved frame rate.

use glam::Vec2;

use super::collision;
use super::note::Note;
use super::player::{Player, SceneBounds};
use super::powerup::{PowerUpKind, PowerUpState};
use super::scoring::{self, PowerUpEffect, ScoreLedger};
use super::state::{GameEvent, RhythmSession};
use crate::consts::*;
use crate::tuning::Tuning;

/// Host-provided inputs for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Wall clock in milliseconds (power-up expiry)
    pub now_ms: f64,
    /// Visible stage size (spawn lane and miss line)
    pub bounds: SceneBounds,
    /// Held movement direction, components in -1..=1 (zero = no movement)
    pub move_dir: Vec2,
    /// Let the engine steer the player (attract mode / headless demo)
    pub autopilot: bool,
}

/// Advance the session by one frame
pub fn tick(session: &mut RhythmSession, input: &TickInput) {
    if !session.is_playing {
        return;
    }

    session.frame += 1;
    let now = input.now_ms;

    // Expiry
    let expiry = session.power.expire(now);
    if expiry.power_reverted {
        log::info!("Power-up expired");
        session.events.push(GameEvent::PowerUpChanged {
            kind: PowerUpKind::Normal,
        });
    }
    if expiry.freeze_ended {
        session.events.push(GameEvent::FreezeChanged { active: false });
    }

    // Movement
    let move_dir = if input.autopilot {
        autopilot_direction(&session.player, &session.power, session.notes.as_slice())
    } else {
        input.move_dir
    };
    if move_dir != Vec2::ZERO {
        session.player.step(move_dir, PLAYER_SPEED, input.bounds);
    }

    // Spawn (a zero interval patched in after construction never spawns)
    if session.frame.checked_rem(session.tuning.spawn_interval_frames) == Some(0) {
        session.spawn_note(input.bounds.width);
    }

    // Fall, then miss or catch. Each resolution lands before the next note is
    // checked, so a mushroom caught this frame already widens the hitbox.
    let RhythmSession {
        notes,
        power,
        ledger,
        player,
        events,
        tuning,
        ..
    } = session;
    let miss_line = input.bounds.height;

    notes.sweep(|note| {
        note.fall(power.freeze_factor);

        let hit = if note.pos.y > miss_line {
            false
        } else if collision::check(note, player, power) {
            true
        } else {
            return None;
        };

        resolve_note(note, hit, now, tuning, power, ledger, events);
        Some(hit)
    });
}

/// Apply a note's terminal event to score, combo and power-ups
pub fn resolve_note(
    note: &Note,
    hit: bool,
    now_ms: f64,
    tuning: &Tuning,
    power: &mut PowerUpState,
    ledger: &mut ScoreLedger,
    events: &mut Vec<GameEvent>,
) {
    let resolution = scoring::resolve(note.kind, hit, power, ledger.combo);
    ledger.apply(&resolution, hit);

    log::debug!(
        "Resolve #{} {:?} hit={} -> {} (score {}, combo {})",
        note.id,
        note.kind,
        hit,
        resolution.feedback.label,
        ledger.score,
        ledger.combo
    );

    match resolution.power_up_effect {
        PowerUpEffect::None => {}
        PowerUpEffect::Grant(kind) => {
            power.set(kind, now_ms, tuning);
            log::info!("Power-up: {} until {:.0}ms", kind.as_str(), power.expires_at_ms);
            events.push(GameEvent::PowerUpChanged { kind });
        }
        PowerUpEffect::Freeze => {
            power.freeze(now_ms, tuning);
            events.push(GameEvent::FreezeChanged { active: true });
        }
        PowerUpEffect::PowerDown => {
            power.power_down();
            log::info!("Power down");
            events.push(GameEvent::PowerUpChanged {
                kind: PowerUpKind::Normal,
            });
        }
    }

    events.push(GameEvent::NoteRemoved { id: note.id });
    events.push(GameEvent::Feedback(resolution.feedback));
    if resolution.hit_effect {
        events.push(GameEvent::HitEffect { pos: note.center() });
    }
    if resolution.screen_shake {
        events.push(GameEvent::ScreenShake);
    }
}

/// Steer toward the lowest catchable note, sidestepping bombs unless invincible
pub fn autopilot_direction(player: &Player, power: &PowerUpState, notes: &[Note]) -> Vec2 {
    let player_center = player.center();
    let catch_line = player.pos.y + player.size;
    let fearless = power.kind == PowerUpKind::Star;

    // Bombs about to land on the player take priority
    if !fearless {
        let threat = notes.iter().find(|n| {
            n.kind.is_hazard()
                && n.pos.y + NOTE_SIZE > player.pos.y - 120.0
                && n.pos.y < catch_line
                && (n.center().x - player_center.x).abs() < (NOTE_SIZE + player.size) / 2.0 + 10.0
        });
        if let Some(bomb) = threat {
            let away = if bomb.center().x > player_center.x { -1.0 } else { 1.0 };
            return Vec2::new(away, 1.0);
        }
    }

    let target = notes
        .iter()
        .filter(|n| fearless || !n.kind.is_hazard())
        .filter(|n| n.pos.y < catch_line)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let dx = match target {
        Some(note) => note.center().x - player_center.x,
        None => 0.0,
    };
    let x = if dx.abs() < PLAYER_SPEED / 2.0 { 0.0 } else { dx.signum() };
    // Hug the floor so the catch window is as wide as possible
    Vec2::new(x, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::note::NoteKind;

    const BOUNDS: SceneBounds = SceneBounds {
        width: 800.0,
        height: 600.0,
    };

    fn input(now_ms: f64) -> TickInput {
        TickInput {
            now_ms,
            bounds: BOUNDS,
            ..Default::default()
        }
    }

    fn started(seed: u64) -> RhythmSession {
        let mut session = RhythmSession::new(seed);
        session.start(BOUNDS);
        session.drain_events();
        session
    }

    /// A note placed so it lands on the player's hitbox on the next tick
    fn note_on_player(session: &mut RhythmSession, kind: NoteKind) -> u32 {
        let id = session.next_note_id();
        let pos = session.player.pos + Vec2::new(4.0, 0.0);
        session.insert_note(Note::new(id, kind, pos, 1.0));
        id
    }

    /// A note placed so it crosses the miss line on the next tick
    fn note_past_floor(session: &mut RhythmSession, kind: NoteKind) -> u32 {
        let id = session.next_note_id();
        session.insert_note(Note::new(id, kind, Vec2::new(25.0, BOUNDS.height), 1.0));
        id
    }

    #[test]
    fn test_idle_when_not_playing() {
        let mut session = RhythmSession::new(1);
        tick(&mut session, &input(0.0));
        assert_eq!(session.frame, 0);
        assert!(session.events.is_empty());
    }

    #[test]
    fn test_spawns_every_hundred_frames() {
        let mut session = started(5);
        for frame in 1..=99 {
            tick(&mut session, &input(frame as f64 * 16.0));
        }
        assert_eq!(session.notes.len(), 0);
        tick(&mut session, &input(1600.0));
        assert_eq!(session.notes.len(), 1);
        assert_eq!(session.frame, 100);
    }

    #[test]
    fn test_fall_respects_freeze() {
        let mut session = started(5);
        session.player.pos.x = 700.0;
        let id = session.next_note_id();
        session.insert_note(Note::new(id, NoteKind::Melody, Vec2::new(25.0, 0.0), 4.0));

        tick(&mut session, &input(0.0));
        assert_eq!(session.notes.get(id).map(|n| n.pos.y), Some(4.0));

        session.power.freeze(0.0, &session.tuning.clone());
        tick(&mut session, &input(10.0));
        assert_eq!(session.notes.get(id).map(|n| n.pos.y), Some(6.0));
    }

    #[test]
    fn test_catch_scores_and_removes() {
        let mut session = started(5);
        let id = note_on_player(&mut session, NoteKind::Melody);
        tick(&mut session, &input(0.0));

        assert_eq!(session.score(), 100);
        assert_eq!(session.combo(), 1);
        assert!(session.notes.get(id).is_none());
        let events = session.drain_events();
        assert!(events.contains(&GameEvent::NoteRemoved { id }));
        assert!(events.iter().any(|e| matches!(e, GameEvent::HitEffect { .. })));
    }

    #[test]
    fn test_mushroom_grants_big_with_expiry() {
        let mut session = started(5);
        note_on_player(&mut session, NoteKind::Mushroom);
        tick(&mut session, &input(1_000.0));

        assert_eq!(session.power_up(), PowerUpKind::Big);
        assert_eq!(session.power.expires_at_ms, 16_000.0);

        tick(&mut session, &input(16_000.0));
        assert_eq!(session.power_up(), PowerUpKind::Big);
        tick(&mut session, &input(16_001.0));
        assert_eq!(session.power_up(), PowerUpKind::Normal);
    }

    #[test]
    fn test_second_ice_re_extends() {
        let mut session = started(5);
        note_on_player(&mut session, NoteKind::Ice);
        tick(&mut session, &input(10_000.0));
        assert_eq!(session.freeze_factor(), 0.5);
        assert_eq!(session.power.freeze_expires_at_ms, 15_000.0);

        note_on_player(&mut session, NoteKind::Ice);
        tick(&mut session, &input(12_000.0));
        assert_eq!(session.freeze_factor(), 0.5);
        assert_eq!(session.power.freeze_expires_at_ms, 17_000.0);
    }

    #[test]
    fn test_missed_bomb_is_harmless() {
        let mut session = started(5);
        session.ledger.score = 400;
        session.ledger.combo = 3;
        let id = note_past_floor(&mut session, NoteKind::Bomb);
        tick(&mut session, &input(0.0));

        assert!(session.notes.get(id).is_none());
        assert_eq!(session.score(), 400);
        assert_eq!(session.combo(), 3);
    }

    #[test]
    fn test_caught_bomb_shakes_and_clamps() {
        let mut session = started(5);
        session.ledger.score = 100;
        session.ledger.combo = 2;
        note_on_player(&mut session, NoteKind::Bomb);
        tick(&mut session, &input(0.0));

        assert_eq!(session.score(), 0);
        assert_eq!(session.combo(), 0);
        assert!(session.drain_events().contains(&GameEvent::ScreenShake));
    }

    #[test]
    fn test_miss_while_powered_keeps_combo() {
        let mut session = started(5);
        let tuning = session.tuning.clone();
        session.power.set(PowerUpKind::Star, 0.0, &tuning);
        session.ledger.combo = 6;
        note_past_floor(&mut session, NoteKind::Melody);
        tick(&mut session, &input(100.0));

        assert_eq!(session.power_up(), PowerUpKind::Normal);
        assert_eq!(session.combo(), 6);

        note_past_floor(&mut session, NoteKind::Melody);
        tick(&mut session, &input(200.0));
        assert_eq!(session.combo(), 0);
    }

    #[test]
    fn test_resolutions_apply_in_order_within_a_frame() {
        let mut session = started(5);
        session.ledger.combo = 4;
        // Mushroom first, then a missed note: the miss sees the fresh power-up
        note_on_player(&mut session, NoteKind::Mushroom);
        note_past_floor(&mut session, NoteKind::Melody);
        tick(&mut session, &input(0.0));

        assert_eq!(session.power_up(), PowerUpKind::Normal);
        assert_eq!(session.combo(), 5);
        assert_eq!(session.score(), 100 + 4 * 10);
    }

    #[test]
    fn test_stop_mid_round_then_restart() {
        let mut session = started(5);
        for frame in 1..=350 {
            tick(&mut session, &input(frame as f64 * 16.0));
        }
        session.stop();
        assert!(session.notes.is_empty());
        let frame = session.frame;
        tick(&mut session, &input(10_000.0));
        assert_eq!(session.frame, frame);

        session.start(BOUNDS);
        assert_eq!(session.frame, 0);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_autopilot_dodges_bomb() {
        let player = Player::new(Vec2::new(400.0, 500.0));
        let bomb = Note::new(1, NoteKind::Bomb, Vec2::new(406.0, 420.0), 3.0);
        let dir = autopilot_direction(&player, &PowerUpState::new(), &[bomb.clone()]);
        assert_eq!(dir.x, -1.0);

        let mut star = PowerUpState::new();
        star.set(PowerUpKind::Star, 0.0, &Tuning::default());
        let dir = autopilot_direction(&player, &star, &[bomb]);
        assert_eq!(dir.x, 0.0);
    }

    #[test]
    fn test_host_positioned_player_catches() {
        let mut session = started(6);
        let id = session.next_note_id();
        session.insert_note(Note::new(id, NoteKind::Melody, Vec2::new(100.0, 450.0), 0.0));
        tick(&mut session, &input(0.0));
        assert!(session.notes.get(id).is_some());

        session.set_player_pos(Vec2::new(96.0, 440.0));
        tick(&mut session, &input(16.0));
        assert!(session.notes.get(id).is_none());
        assert_eq!(session.ledger.catches, 1);
    }

    #[test]
    fn test_zero_interval_never_spawns() {
        let mut session = started(5);
        session.tuning.spawn_interval_frames = 0;
        for frame in 0..300 {
            tick(&mut session, &input(frame as f64));
        }
        assert!(session.active_notes().is_empty());
        assert_eq!(session.frame, 300);
    }

    #[test]
    fn test_determinism() {
        let mut a = started(777);
        let mut b = started(777);
        let steer = TickInput {
            autopilot: true,
            ..input(0.0)
        };
        for frame in 0..2_000 {
            let step = TickInput {
                now_ms: frame as f64 * 16.7,
                ..steer.clone()
            };
            tick(&mut a, &step);
            tick(&mut b, &step);
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.ledger, b.ledger);
        assert_eq!(a.active_notes(), b.active_notes());
    }
}
