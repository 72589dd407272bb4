//! Score and combo rules
//!
//! `resolve` is pure: it turns a note's terminal event (caught or fell off
//! screen) into a [`Resolution`] describing what should change. The session
//! applies it through [`ScoreLedger::apply`] and the power-up machine.

use serde::{Deserialize, Serialize};

use super::note::NoteKind;
use super::powerup::{PowerUpKind, PowerUpState};
use crate::consts::*;

/// What a resolution does to the combo counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComboAction {
    /// Leave it alone (star-destroyed bomb, dodged bomb, powered miss)
    Keep,
    /// Successful catch
    Increment,
    /// Unguarded miss or bomb catch
    Reset,
}

/// Side effect on the power-up machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerUpEffect {
    None,
    /// Switch the primary modifier and restart its timer
    Grant(PowerUpKind),
    /// Start or re-extend the slow-fall timer
    Freeze,
    /// Lose the primary modifier now (the freeze is untouched)
    PowerDown,
}

/// Text popup shown for a resolved note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Feedback {
    pub label: &'static str,
    /// CSS color
    pub color: &'static str,
}

impl Feedback {
    const fn new(label: &'static str, color: &'static str) -> Self {
        Self { label, color }
    }
}

pub const FEEDBACK_PERFECT: Feedback = Feedback::new("PERFECT!", "#0f0");
pub const FEEDBACK_RICH: Feedback = Feedback::new("RICH", "#ffd700");
pub const FEEDBACK_GROW: Feedback = Feedback::new("GROW", "#f80");
pub const FEEDBACK_STAR: Feedback = Feedback::new("STAR POWER", "#ff0");
pub const FEEDBACK_FREEZE: Feedback = Feedback::new("FREEZE", "#0ff");
pub const FEEDBACK_DESTROY: Feedback = Feedback::new("DESTROY", "#f0f");
pub const FEEDBACK_BOOM: Feedback = Feedback::new("BOOM", "#f00");
pub const FEEDBACK_DODGE: Feedback = Feedback::new("DODGE", "#888");
pub const FEEDBACK_POWER_DOWN: Feedback = Feedback::new("POWER DOWN", "#f80");
pub const FEEDBACK_MISS: Feedback = Feedback::new("MISS", "#f00");

/// Everything a single terminal event changes, computed before any of it is
/// applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Signed change to the score (clamped at 0 when applied)
    pub score_delta: i64,
    pub combo_action: ComboAction,
    pub power_up_effect: PowerUpEffect,
    pub feedback: Feedback,
    /// Spawn a hit effect at the note
    pub hit_effect: bool,
    /// Shake the screen (unguarded bomb)
    pub screen_shake: bool,
}

impl Resolution {
    fn new(score_delta: i64, combo_action: ComboAction, feedback: Feedback) -> Self {
        Self {
            score_delta,
            combo_action,
            power_up_effect: PowerUpEffect::None,
            feedback,
            hit_effect: false,
            screen_shake: false,
        }
    }

    fn with_effect(mut self, effect: PowerUpEffect) -> Self {
        self.power_up_effect = effect;
        self
    }
}

/// Decide the outcome of a caught (`hit`) or missed note
pub fn resolve(kind: NoteKind, hit: bool, power: &PowerUpState, combo: u32) -> Resolution {
    match (kind, hit) {
        (NoteKind::Bomb, true) => match power.kind {
            PowerUpKind::Star => Resolution {
                hit_effect: true,
                ..Resolution::new(BOMB_DESTROY_POINTS as i64, ComboAction::Keep, FEEDBACK_DESTROY)
            },
            PowerUpKind::Big => Resolution {
                screen_shake: true,
                ..Resolution::new(-(BOMB_PENALTY as i64), ComboAction::Reset, FEEDBACK_BOOM)
                    .with_effect(PowerUpEffect::PowerDown)
            },
            PowerUpKind::Normal => Resolution {
                screen_shake: true,
                ..Resolution::new(-(BOMB_PENALTY as i64), ComboAction::Reset, FEEDBACK_BOOM)
            },
        },
        // Letting a bomb fall is the right call
        (NoteKind::Bomb, false) => Resolution::new(0, ComboAction::Keep, FEEDBACK_DODGE),
        (kind, true) => {
            let base = match kind {
                NoteKind::Coin => COIN_POINTS,
                _ => CATCH_POINTS,
            } * power.score_multiplier();
            let points = base + combo as u64 * COMBO_BONUS;

            let (effect, feedback) = match kind {
                NoteKind::Mushroom => (PowerUpEffect::Grant(PowerUpKind::Big), FEEDBACK_GROW),
                NoteKind::StarPower => (PowerUpEffect::Grant(PowerUpKind::Star), FEEDBACK_STAR),
                NoteKind::Ice => (PowerUpEffect::Freeze, FEEDBACK_FREEZE),
                NoteKind::Coin => (PowerUpEffect::None, FEEDBACK_RICH),
                NoteKind::Melody | NoteKind::StarIcon | NoteKind::Bomb => {
                    (PowerUpEffect::None, FEEDBACK_PERFECT)
                }
            };

            Resolution {
                hit_effect: true,
                ..Resolution::new(points as i64, ComboAction::Increment, feedback).with_effect(effect)
            }
        }
        (_, false) if power.is_powered() => {
            Resolution::new(0, ComboAction::Keep, FEEDBACK_POWER_DOWN)
                .with_effect(PowerUpEffect::PowerDown)
        }
        (_, false) => Resolution::new(0, ComboAction::Reset, FEEDBACK_MISS),
    }
}

/// Running score for one session
///
/// Score never goes below zero: penalties saturate. `max_combo` is the
/// highest combo reached since the last reset and is never lowered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    pub score: u64,
    /// Current streak of successful catches
    pub combo: u32,
    pub max_combo: u32,
    /// Notes caught (bombs included)
    pub catches: u32,
    /// Notes that fell off screen (bombs included)
    pub misses: u32,
}

impl ScoreLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply score and combo changes; power-up effects are handled by the caller
    pub fn apply(&mut self, resolution: &Resolution, hit: bool) {
        self.score = if resolution.score_delta >= 0 {
            self.score.saturating_add(resolution.score_delta as u64)
        } else {
            self.score.saturating_sub(resolution.score_delta.unsigned_abs())
        };

        match resolution.combo_action {
            ComboAction::Keep => {}
            ComboAction::Increment => self.combo = self.combo.saturating_add(1),
            ComboAction::Reset => self.combo = 0,
        }
        self.max_combo = self.max_combo.max(self.combo);

        if hit {
            self.catches += 1;
        } else {
            self.misses += 1;
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn power(kind: PowerUpKind) -> PowerUpState {
        let mut state = PowerUpState::new();
        state.set(kind, 0.0, &Tuning::default());
        state
    }

    #[test]
    fn test_star_destroys_bomb() {
        let res = resolve(NoteKind::Bomb, true, &power(PowerUpKind::Star), 4);
        assert_eq!(res.score_delta, 200);
        assert_eq!(res.combo_action, ComboAction::Keep);
        assert_eq!(res.power_up_effect, PowerUpEffect::None);
        assert_eq!(res.feedback.label, "DESTROY");
        assert!(!res.screen_shake);
    }

    #[test]
    fn test_unguarded_bomb_clamps_score() {
        let mut ledger = ScoreLedger {
            score: 100,
            combo: 3,
            ..Default::default()
        };
        let res = resolve(NoteKind::Bomb, true, &power(PowerUpKind::Normal), ledger.combo);
        ledger.apply(&res, true);
        assert_eq!(ledger.score, 0);
        assert_eq!(ledger.combo, 0);
        assert_eq!(res.feedback.label, "BOOM");
        assert!(res.screen_shake);
        assert_eq!(res.power_up_effect, PowerUpEffect::None);
    }

    #[test]
    fn test_bomb_while_big_loses_buff() {
        let res = resolve(NoteKind::Bomb, true, &power(PowerUpKind::Big), 0);
        assert_eq!(res.score_delta, -500);
        assert_eq!(res.power_up_effect, PowerUpEffect::PowerDown);
    }

    #[test]
    fn test_missed_bomb_changes_nothing() {
        for kind in [PowerUpKind::Normal, PowerUpKind::Big, PowerUpKind::Star] {
            let mut ledger = ScoreLedger {
                score: 700,
                combo: 5,
                ..Default::default()
            };
            let res = resolve(NoteKind::Bomb, false, &power(kind), ledger.combo);
            ledger.apply(&res, false);
            assert_eq!(ledger.score, 700);
            assert_eq!(ledger.combo, 5);
            assert_eq!(res.power_up_effect, PowerUpEffect::None);
        }
    }

    #[test]
    fn test_coin_under_star_with_combo() {
        let res = resolve(NoteKind::Coin, true, &power(PowerUpKind::Star), 2);
        assert_eq!(res.score_delta, 620);
        assert_eq!(res.combo_action, ComboAction::Increment);
        assert_eq!(res.feedback.label, "RICH");
    }

    #[test]
    fn test_plain_catch_points() {
        let res = resolve(NoteKind::Melody, true, &power(PowerUpKind::Normal), 0);
        assert_eq!(res.score_delta, 100);
        let res = resolve(NoteKind::StarIcon, true, &power(PowerUpKind::Big), 5);
        assert_eq!(res.score_delta, 150);
    }

    #[test]
    fn test_special_notes_trigger_effects() {
        let normal = power(PowerUpKind::Normal);
        assert_eq!(
            resolve(NoteKind::Mushroom, true, &normal, 0).power_up_effect,
            PowerUpEffect::Grant(PowerUpKind::Big)
        );
        assert_eq!(
            resolve(NoteKind::StarPower, true, &normal, 0).power_up_effect,
            PowerUpEffect::Grant(PowerUpKind::Star)
        );
        assert_eq!(
            resolve(NoteKind::Ice, true, &normal, 0).power_up_effect,
            PowerUpEffect::Freeze
        );
        assert_eq!(resolve(NoteKind::Mushroom, true, &normal, 0).feedback.label, "GROW");
    }

    #[test]
    fn test_miss_while_powered_powers_down() {
        let mut ledger = ScoreLedger {
            combo: 8,
            ..Default::default()
        };
        let res = resolve(NoteKind::Melody, false, &power(PowerUpKind::Star), ledger.combo);
        ledger.apply(&res, false);
        assert_eq!(res.power_up_effect, PowerUpEffect::PowerDown);
        assert_eq!(res.feedback.label, "POWER DOWN");
        assert_eq!(ledger.combo, 8);
    }

    #[test]
    fn test_miss_while_normal_resets_combo() {
        let mut ledger = ScoreLedger {
            combo: 8,
            max_combo: 8,
            ..Default::default()
        };
        let res = resolve(NoteKind::Coin, false, &power(PowerUpKind::Normal), ledger.combo);
        ledger.apply(&res, false);
        assert_eq!(res.feedback.label, "MISS");
        assert_eq!(ledger.combo, 0);
        assert_eq!(ledger.max_combo, 8);
        assert_eq!(ledger.misses, 1);
    }

    #[test]
    fn test_freeze_alone_is_not_a_power_up() {
        let mut frozen = PowerUpState::new();
        frozen.freeze(0.0, &Tuning::default());
        let res = resolve(NoteKind::Melody, false, &frozen, 3);
        assert_eq!(res.combo_action, ComboAction::Reset);
    }

    proptest! {
        #[test]
        fn prop_score_never_negative(
            start in 0u64..2_000,
            events in prop::collection::vec((0usize..7, any::<bool>(), 0usize..3), 1..64),
        ) {
            let mut ledger = ScoreLedger { score: start, ..Default::default() };
            for (kind_idx, hit, power_idx) in events {
                let kind = NoteKind::ALL[kind_idx];
                let state = power([PowerUpKind::Normal, PowerUpKind::Big, PowerUpKind::Star][power_idx]);
                let before = ledger.score;
                let res = resolve(kind, hit, &state, ledger.combo);
                ledger.apply(&res, hit);
                if res.score_delta < 0 {
                    prop_assert_eq!(ledger.score, before.saturating_sub(BOMB_PENALTY));
                }
            }
        }
    }
}
