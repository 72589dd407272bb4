//! Catch detection
//!
//! Plain axis-aligned boxes. The player's box is inset horizontally (or grown,
//! while big) and never includes the top of the sprite, so notes are caught
//! with the lower body.

use glam::Vec2;

use super::note::Note;
use super::player::Player;
use super::powerup::PowerUpState;
use crate::consts::*;

/// Axis-aligned box, y grows downward
///
/// Stored as edges rather than origin + size, since every test compares edges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Smallest x
    pub left: f32,
    /// Largest x
    pub right: f32,
    /// Smallest y (visually the top)
    pub top: f32,
    /// Largest y
    pub bottom: f32,
}

impl Rect {
    /// Build from edges; callers keep `left <= right` and `top <= bottom`
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    /// Box with its top-left corner at `pos`
    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.x + size.x, pos.y, pos.y + size.y)
    }

    /// Overlap as the negation of "clearly apart"; shared edges count as overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(self.right < other.left
            || self.left > other.right
            || self.bottom < other.top
            || self.top > other.bottom)
    }
}

/// The player's catching box under the current power-up
///
/// Horizontally inset by [`PowerUpState::hitbox_inset`] per side (negative
/// while big, so the box is wider than the sprite). Vertically it spans from
/// `HITBOX_HEAD_CLEARANCE` below the sprite top down to its bottom edge.
pub fn player_hitbox(player: &Player, power: &PowerUpState) -> Rect {
    let inset = power.hitbox_inset();
    let Vec2 { x, y } = player.pos;
    Rect::new(
        x + inset,
        x + player.size - inset,
        y + HITBOX_HEAD_CLEARANCE,
        y + player.size,
    )
}

/// A note's box is its full sprite
pub fn note_hitbox(note: &Note) -> Rect {
    Rect::from_pos_size(note.pos, Vec2::splat(NOTE_SIZE))
}

/// Does the player catch this note right now?
pub fn check(note: &Note, player: &Player, power: &PowerUpState) -> bool {
    player_hitbox(player, power).overlaps(&note_hitbox(note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::note::NoteKind;
    use crate::sim::powerup::PowerUpKind;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    fn note_at(x: f32, y: f32) -> Note {
        Note::new(1, NoteKind::Melody, Vec2::new(x, y), 3.0)
    }

    fn big() -> PowerUpState {
        let mut power = PowerUpState::new();
        power.set(PowerUpKind::Big, 0.0, &Tuning::default());
        power
    }

    #[test]
    fn test_player_hitbox_geometry() {
        let player = Player::new(Vec2::new(100.0, 400.0));
        let normal = player_hitbox(&player, &PowerUpState::new());
        assert_eq!(normal, Rect::new(105.0, 143.0, 420.0, 448.0));

        let grown = player_hitbox(&player, &big());
        assert_eq!(grown, Rect::new(85.0, 163.0, 420.0, 448.0));
    }

    #[test]
    fn test_head_does_not_catch() {
        let player = Player::new(Vec2::new(100.0, 400.0));
        // Note bottom at 419.9, just above the hitbox top at 420
        assert!(!check(&note_at(100.0, 379.9), &player, &PowerUpState::new()));
        // Bottom edge exactly on the hitbox top still counts
        assert!(check(&note_at(100.0, 380.0), &player, &PowerUpState::new()));
    }

    #[test]
    fn test_edges_are_inclusive() {
        let player = Player::new(Vec2::new(100.0, 400.0));
        let power = PowerUpState::new();
        // Note right edge (65 + 40) touches hitbox left (105)
        assert!(check(&note_at(65.0, 410.0), &player, &power));
        assert!(!check(&note_at(64.9, 410.0), &player, &power));
        // Note left edge touches hitbox right (143)
        assert!(check(&note_at(143.0, 410.0), &player, &power));
        assert!(!check(&note_at(143.1, 410.0), &player, &power));
    }

    #[test]
    fn test_big_widens_reach() {
        let player = Player::new(Vec2::new(100.0, 400.0));
        let note = note_at(50.0, 410.0);
        assert!(!check(&note, &player, &PowerUpState::new()));
        assert!(check(&note, &player, &big()));
    }

    proptest! {
        #[test]
        fn prop_overlap_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.0f32..100.0, ah in 0.0f32..100.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.0f32..100.0, bh in 0.0f32..100.0,
        ) {
            let a = Rect::from_pos_size(Vec2::new(ax, ay), Vec2::new(aw, ah));
            let b = Rect::from_pos_size(Vec2::new(bx, by), Vec2::new(bw, bh));
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
