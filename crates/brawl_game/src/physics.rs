use serde::Deserialize;

use crate::config::WorldConfig;
use crate::entity::{Entity, Facing};

/// Movement edges for one tick, already folded in arrival order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerInput {
    /// The last direction edge this tick was a key going down.
    pub press: Option<Facing>,
    /// A direction key came up this tick.
    pub stop: bool,
    pub jump: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PhysicsConfig {
    pub walk_speed: i32,
    pub jump_velocity: i32,
    pub gravity: i32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5,
            jump_velocity: -15,
            gravity: 1,
        }
    }
}

/// Horizontal speed is set directly by key edges; there is no acceleration
/// or friction model. `press` is only set when a press was the last
/// direction edge of the tick, so applying the stop first leaves a tapped key
/// at rest and a release followed by a press moving.
pub fn apply_input(entity: &mut Entity, input: ControllerInput, config: &PhysicsConfig) {
    if input.stop {
        entity.vel.x = 0;
    }
    if let Some(direction) = input.press {
        entity.vel.x = direction.sign() * config.walk_speed;
        entity.facing = direction;
    }
    // Jump is edge-triggered and only legal from grounded state.
    if input.jump && entity.grounded {
        entity.vel.y = config.jump_velocity;
        entity.grounded = false;
    }
}

/// Integrate one tick: move, fall, then snap to the floor line.
pub fn step(entity: &mut Entity, config: &PhysicsConfig, world: &WorldConfig) {
    entity.pos += entity.vel;
    if !entity.grounded {
        entity.vel.y += config.gravity;
    }

    if entity.bottom() >= world.ground_y {
        entity.pos.y = world.ground_y - entity.size.y;
        entity.vel.y = 0;
        entity.grounded = true;
    }

    let max_x = (world.width - entity.size.x).max(0);
    entity.pos.x = entity.pos.x.clamp(0, max_x);
}
