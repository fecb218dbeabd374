use glam::IVec2;
use serde::Deserialize;

use crate::combat::Rect;
use crate::config::WorldConfig;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: i32,
    pub height: i32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

/// Visible window onto the world. Recomputed every tick, never stored state
/// of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub origin: IVec2,
    pub size: IVec2,
}

impl Viewport {
    /// Follow the player horizontally; the vertical origin is fixed by the
    /// floor line.
    pub fn track(
        player_x: i32,
        sprite_w: i32,
        player_h: i32,
        view: &ViewportConfig,
        world: &WorldConfig,
    ) -> Self {
        Self {
            origin: IVec2::new(
                camera_x(player_x, sprite_w / 2, view.width, world.width),
                camera_y(world.ground_y, player_h, view.height),
            ),
            size: IVec2::new(view.width, view.height),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.size.x, self.size.y)
    }

    pub fn to_screen(&self, world_pos: IVec2) -> IVec2 {
        world_pos - self.origin
    }
}

/// `player_x + half_w - viewport_w / 2`, clamped to `[0, world_w - viewport_w]`.
pub fn camera_x(player_x: i32, half_w: i32, viewport_w: i32, world_w: i32) -> i32 {
    let max_x = (world_w - viewport_w).max(0);
    (player_x + half_w - viewport_w / 2).clamp(0, max_x)
}

pub fn camera_y(ground_y: i32, player_h: i32, viewport_h: i32) -> i32 {
    (ground_y + player_h - viewport_h).max(0)
}
