//! The catcher controlled by the player

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Visible stage size, supplied by the host every frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneBounds {
    pub width: f32,
    pub height: f32,
}

impl SceneBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

impl Default for SceneBounds {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner in scene coordinates
    pub pos: Vec2,
    /// Sprite edge length (the hitbox is derived from it)
    pub size: f32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            size: PLAYER_SIZE,
        }
    }
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            ..Default::default()
        }
    }

    /// Standing spot at the bottom middle of the stage
    pub fn spawn_point(bounds: SceneBounds) -> Vec2 {
        Vec2::new(
            (bounds.width - PLAYER_SIZE) / 2.0,
            bounds.height - PLAYER_SIZE - 20.0,
        )
    }

    /// Move by `speed` along each held axis and clamp to the room floor.
    /// `dir` components are expected in -1..=1.
    pub fn step(&mut self, dir: Vec2, speed: f32, bounds: SceneBounds) {
        self.pos += dir * speed;
        self.clamp_to(bounds);
    }

    /// Keep the sprite on stage, inside the lower part of the room
    pub fn clamp_to(&mut self, bounds: SceneBounds) {
        let max_x = (bounds.width - self.size).max(0.0);
        let max_y = (bounds.height - self.size).max(0.0);
        let min_y = (bounds.height * ROOM_FLOOR_RATIO).min(max_y);
        self.pos.x = self.pos.x.clamp(0.0, max_x);
        self.pos.y = self.pos.y.clamp(min_y, max_y);
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clamps_to_floor() {
        let bounds = SceneBounds::new(800.0, 600.0);
        let mut player = Player::new(Player::spawn_point(bounds));
        assert_eq!(player.pos, Vec2::new(376.0, 532.0));

        // Walking up stops at 60% of the stage height
        for _ in 0..100 {
            player.step(Vec2::new(0.0, -1.0), PLAYER_SPEED, bounds);
        }
        assert_eq!(player.pos.y, 360.0);

        // Walking right stops at the wall
        for _ in 0..100 {
            player.step(Vec2::new(1.0, 0.0), PLAYER_SPEED, bounds);
        }
        assert_eq!(player.pos.x, 752.0);
    }

    #[test]
    fn test_tiny_stage_does_not_invert_clamp() {
        let mut player = Player::new(Vec2::new(10.0, 10.0));
        player.clamp_to(SceneBounds::new(20.0, 20.0));
        assert_eq!(player.pos, Vec2::ZERO);
    }
}
