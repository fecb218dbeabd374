//! Enemy patrol: walk in the facing direction, turn at random, bounce off
//! the world edges. A zero patrol speed gives stationary enemies.

use rand::Rng;
use serde::Deserialize;

use crate::config::WorldConfig;
use crate::entity::{Action, Entity};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct EnemyConfig {
    pub width: i32,
    pub height: i32,
    pub patrol_speed: i32,
    /// Chance per tick, in percent, that a patrolling enemy turns around.
    pub turn_chance_percent: u32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            width: 60,
            height: 80,
            patrol_speed: 2,
            turn_chance_percent: 1,
        }
    }
}

pub fn patrol(enemy: &mut Entity, config: &EnemyConfig, world: &WorldConfig, rng: &mut impl Rng) {
    if matches!(enemy.action(), Action::Hurt | Action::Dying | Action::Dead) {
        enemy.vel.x = 0;
        return;
    }
    if config.patrol_speed == 0 {
        enemy.vel.x = 0;
        enemy.set_action(Action::Idle);
        return;
    }

    if rng.gen_range(0..100) < config.turn_chance_percent {
        enemy.facing = enemy.facing.flipped();
    }
    let max_x = (world.width - enemy.size.x).max(0);
    if enemy.pos.x <= 0 && enemy.facing.sign() < 0 {
        enemy.facing = enemy.facing.flipped();
    } else if enemy.pos.x >= max_x && enemy.facing.sign() > 0 {
        enemy.facing = enemy.facing.flipped();
    }

    enemy.vel.x = enemy.facing.sign() * config.patrol_speed;
    enemy.set_action(Action::Walking);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Facing;
    use glam::IVec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn world() -> WorldConfig {
        WorldConfig {
            width: 2560,
            ground_y: 810,
        }
    }

    fn grunt_at(x: i32, facing: Facing) -> Entity {
        Entity::enemy(IVec2::new(x, 730), IVec2::new(60, 80), 1, facing)
    }

    fn steady() -> EnemyConfig {
        EnemyConfig {
            turn_chance_percent: 0,
            ..EnemyConfig::default()
        }
    }

    #[test]
    fn walks_in_facing_direction() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = grunt_at(500, Facing::Left);
        patrol(&mut enemy, &steady(), &world(), &mut rng);
        assert_eq!(enemy.vel.x, -2);
        assert_eq!(enemy.action(), Action::Walking);
    }

    #[test]
    fn bounces_off_world_edges() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = grunt_at(0, Facing::Left);
        patrol(&mut enemy, &steady(), &world(), &mut rng);
        assert_eq!(enemy.facing, Facing::Right);
        assert_eq!(enemy.vel.x, 2);

        let mut enemy = grunt_at(2500, Facing::Right);
        patrol(&mut enemy, &steady(), &world(), &mut rng);
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn always_turning_flips_every_tick() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = EnemyConfig {
            turn_chance_percent: 100,
            ..EnemyConfig::default()
        };
        let mut enemy = grunt_at(500, Facing::Left);
        patrol(&mut enemy, &config, &world(), &mut rng);
        assert_eq!(enemy.facing, Facing::Right);
        patrol(&mut enemy, &config, &world(), &mut rng);
        assert_eq!(enemy.facing, Facing::Left);
    }

    #[test]
    fn hurt_and_dying_enemies_hold_still() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut enemy = grunt_at(500, Facing::Left);
        enemy.stagger(1000);
        patrol(&mut enemy, &steady(), &world(), &mut rng);
        assert_eq!(enemy.vel.x, 0);
        assert_eq!(enemy.action(), Action::Hurt);
    }

    #[test]
    fn zero_speed_stands_idle() {
        let mut rng = StdRng::seed_from_u64(7);
        let config = EnemyConfig {
            patrol_speed: 0,
            ..EnemyConfig::default()
        };
        let mut enemy = grunt_at(500, Facing::Left);
        patrol(&mut enemy, &config, &world(), &mut rng);
        assert_eq!(enemy.vel.x, 0);
        assert_eq!(enemy.action(), Action::Idle);
    }
}
