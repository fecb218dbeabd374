//! Round tuning loaded from JSON.
//!
//! Every field has a default, so `{}` is a valid config that reproduces the
//! built-in two-phase round. Validation is strict so the simulation can rely
//! on positive sizes and a non-empty phase list without re-checking per tick.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::ai::EnemyConfig;
use crate::camera::ViewportConfig;
use crate::combat::CombatConfig;
use crate::phase::{FadeConfig, PhaseConfig};
use crate::physics::PhysicsConfig;
use crate::spawn::SpawnConfig;

pub const CONFIG_FORMAT_VERSION: &str = "0.1";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct WorldConfig {
    /// Width of the scrolling background in world pixels.
    pub width: i32,
    /// Y of the floor line; entities stand with their bottom edge on it.
    pub ground_y: i32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 2560,
            ground_y: 810,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: i32,
    pub height: i32,
    pub start_x: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 71,
            height: 79,
            start_x: 100,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct FrameConfig {
    pub tick_ms: u64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self { tick_ms: 16 }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    pub version: String,
    pub viewport: ViewportConfig,
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub enemy: EnemyConfig,
    pub combat: CombatConfig,
    pub spawn: SpawnConfig,
    pub fade: FadeConfig,
    pub frame: FrameConfig,
    pub phases: Vec<PhaseConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_FORMAT_VERSION.to_string(),
            viewport: ViewportConfig::default(),
            world: WorldConfig::default(),
            physics: PhysicsConfig::default(),
            player: PlayerConfig::default(),
            enemy: EnemyConfig::default(),
            combat: CombatConfig::default(),
            spawn: SpawnConfig::default(),
            fade: FadeConfig::default(),
            frame: FrameConfig::default(),
            phases: vec![
                PhaseConfig {
                    label: "LEVEL 1".to_string(),
                    timer_secs: 15,
                    max_enemies: 3,
                    enemy_hp: 1,
                },
                PhaseConfig {
                    label: "LEVEL 2".to_string(),
                    timer_secs: 30,
                    max_enemies: 1,
                    enemy_hp: 2,
                },
            ],
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &GameConfig) -> Result<(), String> {
    if config.version != CONFIG_FORMAT_VERSION {
        return Err(format!(
            "Config validation failed: unsupported version '{}'",
            config.version
        ));
    }
    if config.viewport.width <= 0 || config.viewport.height <= 0 {
        return Err("Config validation failed: viewport size must be > 0".to_string());
    }
    if config.world.width < config.viewport.width {
        return Err(format!(
            "Config validation failed: world width {} is narrower than the viewport {}",
            config.world.width, config.viewport.width
        ));
    }
    if config.player.width <= 0 || config.player.height <= 0 {
        return Err("Config validation failed: player size must be > 0".to_string());
    }
    if config.enemy.width <= 0 || config.enemy.height <= 0 {
        return Err("Config validation failed: enemy size must be > 0".to_string());
    }
    if config.enemy.turn_chance_percent > 100 {
        return Err("Config validation failed: turn_chance_percent must be <= 100".to_string());
    }
    if config.physics.gravity <= 0 {
        return Err("Config validation failed: gravity must be > 0".to_string());
    }
    if config.physics.jump_velocity >= 0 {
        return Err("Config validation failed: jump_velocity must be negative".to_string());
    }
    if config.combat.damage == 0 {
        return Err("Config validation failed: combat damage must be > 0".to_string());
    }
    if config.fade.step == 0 {
        return Err("Config validation failed: fade step must be > 0".to_string());
    }
    if config.frame.tick_ms == 0 {
        return Err("Config validation failed: tick_ms must be > 0".to_string());
    }
    if config.spawn.margin < 0 {
        return Err("Config validation failed: spawn margin must be >= 0".to_string());
    }
    if config.phases.is_empty() {
        return Err("Config validation failed: phases array is empty".to_string());
    }
    for (i, phase) in config.phases.iter().enumerate() {
        if phase.timer_secs == 0 {
            return Err(format!(
                "Config validation failed: phase {} '{}' has a zero timer",
                i, phase.label
            ));
        }
        if phase.enemy_hp == 0 {
            return Err(format!(
                "Config validation failed: phase {} '{}' spawns enemies with zero hp",
                i, phase.label
            ));
        }
        if phase.max_enemies > config.spawn.roster_capacity {
            return Err(format!(
                "Config validation failed: phase {} '{}' wants {} enemies but the roster holds {}",
                i, phase.label, phase.max_enemies, config.spawn.roster_capacity
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::StrikeShape;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "brawl_config_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn default_config_is_valid() {
        validate_config(&GameConfig::default()).expect("defaults should validate");
    }

    #[test]
    fn empty_object_yields_defaults() {
        let path = temp_file_path("empty");
        fs::write(&path, "{}").expect("write temp file");

        let config = load_config_from_path(&path).expect("empty config should load");
        assert_eq!(config.phases.len(), 2);
        assert_eq!(config.phases[0].timer_secs, 15);
        assert_eq!(config.phases[1].enemy_hp, 2);
        assert_eq!(config.world.ground_y, 810);
        assert_eq!(config.combat.active_frame, 2);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let path = temp_file_path("partial");
        fs::write(
            &path,
            r#"{
              "physics": { "gravity": 2 },
              "combat": { "shape": "body" },
              "phases": [ { "label": "ARENA", "timer_secs": 5, "max_enemies": 2, "enemy_hp": 3 } ]
            }"#,
        )
        .expect("write temp file");

        let config = load_config_from_path(&path).expect("partial config should load");
        assert_eq!(config.physics.gravity, 2);
        assert_eq!(config.physics.walk_speed, 5);
        assert_eq!(config.combat.shape, StrikeShape::Body);
        assert_eq!(config.phases.len(), 1);
        assert_eq!(config.phases[0].label, "ARENA");

        let _ = fs::remove_file(path);
    }

    #[test]
    fn rejects_world_narrower_than_viewport() {
        let mut config = GameConfig::default();
        config.world.width = 640;
        let err = validate_config(&config).expect_err("narrow world should fail");
        assert!(err.contains("narrower than the viewport"));
    }

    #[test]
    fn rejects_empty_phase_list() {
        let mut config = GameConfig::default();
        config.phases.clear();
        let err = validate_config(&config).expect_err("no phases should fail");
        assert!(err.contains("phases array is empty"));
    }

    #[test]
    fn rejects_phase_cap_above_roster_capacity() {
        let mut config = GameConfig::default();
        config.phases[0].max_enemies = 11;
        let err = validate_config(&config).expect_err("cap above capacity should fail");
        assert!(err.contains("roster holds 10"));
    }

    #[test]
    fn rejects_unknown_version() {
        let path = temp_file_path("version");
        fs::write(&path, r#"{ "version": "2.0" }"#).expect("write temp file");
        let err = load_config_from_path(&path).expect_err("bad version should fail");
        assert!(err.contains("unsupported version"));
        let _ = fs::remove_file(path);
    }
}
