//! Enemy roster and wave replenishment.
//!
//! The roster is a fixed array of slots. A slot is reusable when it is empty
//! or its occupant has finished dying; a dying enemy keeps its slot until its
//! death animation completes, which is why the roster capacity may exceed a
//! phase's enemy cap. Spawn positions are random within the visible band and
//! are not checked against existing enemies.

use glam::IVec2;
use rand::Rng;
use serde::Deserialize;

use crate::ai::EnemyConfig;
use crate::entity::{Action, Entity, Facing};
use crate::phase::PhaseConfig;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct SpawnConfig {
    /// Distance kept from both viewport edges when picking a spawn x.
    pub margin: i32,
    pub roster_capacity: usize,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            margin: 100,
            roster_capacity: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Roster {
    slots: Vec<Option<Entity>>,
}

impl Roster {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn living_count(&self) -> usize {
        self.iter().filter(|e| e.is_alive()).count()
    }

    /// Enemies still in play (alive or playing their death animation).
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.slots
            .iter()
            .flatten()
            .filter(|e| e.action() != Action::Dead)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.slots
            .iter_mut()
            .flatten()
            .filter(|e| e.action() != Action::Dead)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
    }

    /// Place `entity` in the first reusable slot. Returns false when every
    /// slot is occupied.
    pub fn insert(&mut self, entity: Entity) -> bool {
        let free = self.slots.iter_mut().find(|slot| match slot {
            None => true,
            Some(e) => e.action() == Action::Dead,
        });
        match free {
            Some(slot) => {
                *slot = Some(entity);
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpawnDirector {
    pub config: SpawnConfig,
    pub enemy: EnemyConfig,
    pub viewport_w: i32,
    pub ground_y: i32,
}

impl SpawnDirector {
    pub fn spawn_one(&self, hp: u32, camera_x: i32, rng: &mut impl Rng) -> Entity {
        let span = self.viewport_w - 2 * self.config.margin - self.enemy.width;
        let offset = if span > 0 { rng.gen_range(0..span) } else { 0 };
        let facing = if rng.gen_bool(0.5) {
            Facing::Left
        } else {
            Facing::Right
        };
        Entity::enemy(
            IVec2::new(
                camera_x + self.config.margin + offset,
                self.ground_y - self.enemy.height,
            ),
            IVec2::new(self.enemy.width, self.enemy.height),
            hp,
            facing,
        )
    }

    /// Top the roster up to the phase cap. Returns how many enemies spawned.
    pub fn replenish(
        &self,
        roster: &mut Roster,
        phase: &PhaseConfig,
        camera_x: i32,
        rng: &mut impl Rng,
    ) -> usize {
        let mut living = roster.living_count();
        let mut spawned = 0;
        while living < phase.max_enemies {
            let enemy = self.spawn_one(phase.enemy_hp, camera_x, rng);
            let x = enemy.pos.x;
            if !roster.insert(enemy) {
                log::debug!("Roster full, skipping spawn");
                break;
            }
            log::debug!("Spawned enemy at x={} with {} hp", x, phase.enemy_hp);
            living += 1;
            spawned += 1;
        }
        spawned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn director() -> SpawnDirector {
        SpawnDirector {
            config: SpawnConfig::default(),
            enemy: EnemyConfig::default(),
            viewport_w: 1280,
            ground_y: 810,
        }
    }

    fn phase(max_enemies: usize, enemy_hp: u32) -> PhaseConfig {
        PhaseConfig {
            label: "TEST".to_string(),
            timer_secs: 10,
            max_enemies,
            enemy_hp,
        }
    }

    #[test]
    fn spawns_inside_margin_band_on_the_floor() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..200 {
            let enemy = director.spawn_one(2, 400, &mut rng);
            assert!(enemy.pos.x >= 400 + 100);
            assert!(enemy.pos.x + enemy.size.x <= 400 + 1280 - 100);
            assert_eq!(enemy.bottom(), 810);
            assert_eq!(enemy.hp, 2);
            assert!(enemy.is_alive());
        }
    }

    #[test]
    fn replenish_fills_to_cap_and_no_further() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(2);
        let mut roster = Roster::with_capacity(10);
        assert_eq!(director.replenish(&mut roster, &phase(3, 1), 0, &mut rng), 3);
        assert_eq!(roster.living_count(), 3);
        assert_eq!(director.replenish(&mut roster, &phase(3, 1), 0, &mut rng), 0);
        assert_eq!(roster.living_count(), 3);
    }

    #[test]
    fn death_is_replaced_within_one_check() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(3);
        let mut roster = Roster::with_capacity(10);
        director.replenish(&mut roster, &phase(3, 1), 0, &mut rng);

        let victim = roster.iter_mut().next().expect("roster has enemies");
        assert!(victim.apply_damage(1));
        assert_eq!(roster.living_count(), 2);
        // Dying enemy still occupies its slot and is still listed.
        assert_eq!(roster.iter().count(), 3);

        assert_eq!(director.replenish(&mut roster, &phase(3, 1), 0, &mut rng), 1);
        assert_eq!(roster.living_count(), 3);
        assert_eq!(roster.iter().count(), 4);
    }

    #[test]
    fn dead_slots_are_reused() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(4);
        let mut roster = Roster::with_capacity(2);
        director.replenish(&mut roster, &phase(2, 1), 0, &mut rng);
        for enemy in roster.iter_mut() {
            enemy.apply_damage(1);
            enemy.set_action(Action::Dead);
        }
        assert_eq!(roster.iter().count(), 0);
        assert_eq!(director.replenish(&mut roster, &phase(2, 1), 0, &mut rng), 2);
        assert_eq!(roster.living_count(), 2);
    }

    #[test]
    fn full_roster_skips_spawn() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(5);
        let mut roster = Roster::with_capacity(1);
        director.replenish(&mut roster, &phase(1, 1), 0, &mut rng);
        roster.iter_mut().for_each(|e| {
            e.apply_damage(1);
        });
        // Only slot is held by a dying enemy.
        assert_eq!(director.replenish(&mut roster, &phase(1, 1), 0, &mut rng), 0);
        assert_eq!(roster.living_count(), 0);
    }

    #[test]
    fn clear_empties_every_slot() {
        let director = director();
        let mut rng = StdRng::seed_from_u64(6);
        let mut roster = Roster::with_capacity(10);
        director.replenish(&mut roster, &phase(3, 1), 0, &mut rng);
        roster.clear();
        assert_eq!(roster.iter().count(), 0);
        assert_eq!(roster.capacity(), 10);
    }
}
