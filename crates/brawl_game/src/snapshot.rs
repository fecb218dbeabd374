//! Save/resume state as versioned JSON with named fields.
//!
//! Snapshots are scratch state for resuming an interrupted round on the same
//! build; anything but the current version tag is rejected. Transient actions
//! (`Attacking`, `Hurt`) are not carried over: a restored entity starts in
//! its resting action.

use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::entity::{Action, Entity, EntityKind, Facing};
use crate::world::World;

pub const SNAPSHOT_FORMAT_VERSION: &str = "0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub kind: EntityKind,
    pub pos: IVec2,
    pub vel: IVec2,
    pub size: IVec2,
    pub facing: Facing,
    pub grounded: bool,
    pub action: Action,
    pub hp: u32,
}

impl EntitySnapshot {
    pub fn capture(entity: &Entity) -> Self {
        Self {
            kind: entity.kind,
            pos: entity.pos,
            vel: entity.vel,
            size: entity.size,
            facing: entity.facing,
            grounded: entity.grounded,
            action: entity.action(),
            hp: entity.hp,
        }
    }

    pub fn to_entity(&self) -> Entity {
        let mut entity = match self.kind {
            EntityKind::Player => Entity::player(self.pos, self.size),
            EntityKind::Enemy => Entity::enemy(self.pos, self.size, self.hp, self.facing),
        };
        entity.vel = self.vel;
        entity.facing = self.facing;
        entity.grounded = self.grounded;
        let action = match self.action {
            // An enemy out of hp can no longer be damaged, so it has to be
            // on its way out.
            other if self.kind == EntityKind::Enemy && self.hp == 0 && other.is_alive() => {
                Action::Dying
            }
            Action::Attacking | Action::Hurt => entity.default_action(),
            other => other,
        };
        entity.set_action(action);
        entity
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub version: String,
    pub phase_index: usize,
    pub timer_secs: u32,
    pub score: u32,
    pub tick: u64,
    pub player: EntitySnapshot,
    pub enemies: Vec<EntitySnapshot>,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            version: SNAPSHOT_FORMAT_VERSION.to_string(),
            phase_index: world.phase.index(),
            timer_secs: world.phase.timer_secs(),
            score: world.score,
            tick: world.tick,
            player: EntitySnapshot::capture(&world.player),
            enemies: world.roster.iter().map(EntitySnapshot::capture).collect(),
        }
    }
}

pub fn save_snapshot(path: &Path, snapshot: &WorldSnapshot) -> Result<(), String> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| format!("Failed to serialize snapshot: {e}"))?;
    fs::write(path, json).map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    log::info!("Saved round state to {}", path.display());
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<WorldSnapshot, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let snapshot: WorldSnapshot = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse snapshot JSON {}: {e}", path.display()))?;
    validate_snapshot(&snapshot)?;
    Ok(snapshot)
}

fn validate_snapshot(snapshot: &WorldSnapshot) -> Result<(), String> {
    if snapshot.version != SNAPSHOT_FORMAT_VERSION {
        return Err(format!(
            "Snapshot validation failed: unsupported version '{}'",
            snapshot.version
        ));
    }
    if snapshot.player.kind != EntityKind::Player {
        return Err("Snapshot validation failed: player entry is not a player".to_string());
    }
    for (i, enemy) in snapshot.enemies.iter().enumerate() {
        if enemy.kind != EntityKind::Enemy {
            return Err(format!(
                "Snapshot validation failed: enemies[{}] is not an enemy",
                i
            ));
        }
        if enemy.size.x <= 0 || enemy.size.y <= 0 {
            return Err(format!(
                "Snapshot validation failed: enemies[{}] has a non-positive size",
                i
            ));
        }
        if enemy.hp == 0 && enemy.action.is_alive() {
            return Err(format!(
                "Snapshot validation failed: enemies[{}] has 0 hp but is {:?}",
                i, enemy.action
            ));
        }
    }
    Ok(())
}
