//! Round state and the fixed per-tick update order.
//!
//! `World` owns everything one round mutates. `step` runs the components in
//! this order, once per tick:
//!
//! 1. input intent (velocity edges, jump, swing start)
//! 2. physics (player, then enemy patrol + integration)
//! 3. animation clocks
//! 4. combat resolution and scoring
//! 5. spawn replenishment
//! 6. camera
//! 7. phase sequencing
//!
//! While the phase sequencer holds the screen black (or the round is over)
//! only step 7 runs.

use brawl_core::animation::SheetSet;
use glam::IVec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ai;
use crate::animation::{self, SheetRegistry, GRUNT_SHEET};
use crate::camera::Viewport;
use crate::combat;
use crate::config::{validate_config, GameConfig};
use crate::entity::{Action, Entity};
use crate::phase::{PhaseEvent, PhaseSequencer, PhaseState};
use crate::physics::{self, ControllerInput};
use crate::snapshot::WorldSnapshot;
use crate::spawn::{Roster, SpawnDirector};

const PLAYER_CLIPS: &[&str] = &["idle", "walk", "attack"];
const ENEMY_CLIPS: &[&str] = &["walk", "death"];

/// What the player asked for this tick, already mapped from keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickIntent {
    pub movement: ControllerInput,
    /// Attack key went down this tick.
    pub attack: bool,
}

/// Handed to the round-over collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundResult {
    pub score: u32,
    pub phases_played: usize,
    pub ticks: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Running,
    RoundOver(RoundResult),
}

pub struct World {
    pub config: GameConfig,
    pub player: Entity,
    pub roster: Roster,
    pub phase: PhaseSequencer,
    pub viewport: Viewport,
    pub score: u32,
    /// Simulated ticks; frozen while the phase sequencer holds.
    pub tick: u64,
    player_sheet: SheetSet,
    enemy_sheet: SheetSet,
    spawner: SpawnDirector,
    rng: StdRng,
}

impl World {
    pub fn new(
        config: GameConfig,
        sheets: &SheetRegistry,
        player_sheet_id: &str,
        seed: u64,
        now_ms: u64,
    ) -> Result<Self, String> {
        validate_config(&config)?;
        sheets.validate_required(player_sheet_id, PLAYER_CLIPS)?;
        sheets.validate_required(GRUNT_SHEET, ENEMY_CLIPS)?;
        let player_sheet = sheets
            .get(player_sheet_id)
            .cloned()
            .ok_or_else(|| format!("Sheet set '{}' is not registered", player_sheet_id))?;
        let enemy_sheet = sheets
            .get(GRUNT_SHEET)
            .cloned()
            .ok_or_else(|| format!("Sheet set '{}' is not registered", GRUNT_SHEET))?;

        let attack_frames = sheets
            .resolve_clip(player_sheet_id, Action::Attacking)
            .map_or(0, |clip| clip.frames);
        if config.combat.active_frame >= attack_frames {
            return Err(format!(
                "Config validation failed: active_frame {} is outside the {}-frame attack clip of '{}'",
                config.combat.active_frame, attack_frames, player_sheet_id
            ));
        }

        let player = Entity::player(
            IVec2::new(
                config.player.start_x,
                config.world.ground_y - config.player.height,
            ),
            IVec2::new(config.player.width, config.player.height),
        );
        let spawner = SpawnDirector {
            config: config.spawn,
            enemy: config.enemy,
            viewport_w: config.viewport.width,
            ground_y: config.world.ground_y,
        };
        let viewport = Viewport::track(
            player.pos.x,
            player.size.x,
            player.size.y,
            &config.viewport,
            &config.world,
        );

        let mut world = Self {
            roster: Roster::with_capacity(config.spawn.roster_capacity),
            phase: PhaseSequencer::new(config.phases.clone(), config.fade, now_ms),
            config,
            player,
            viewport,
            score: 0,
            tick: 0,
            player_sheet,
            enemy_sheet,
            spawner,
            rng: StdRng::seed_from_u64(seed),
        };
        world.replenish();
        log::info!(
            "Round started: phase '{}' ({}s), sheet '{}', seed {}",
            world.phase.current().label,
            world.phase.timer_secs(),
            player_sheet_id,
            seed
        );
        Ok(world)
    }

    pub fn player_sheet(&self) -> &SheetSet {
        &self.player_sheet
    }

    pub fn enemy_sheet(&self) -> &SheetSet {
        &self.enemy_sheet
    }

    pub fn round_result(&self) -> RoundResult {
        RoundResult {
            score: self.score,
            phases_played: self.phase.index() + 1,
            ticks: self.tick,
        }
    }

    pub fn step(&mut self, intent: TickIntent, now_ms: u64) -> StepOutcome {
        if !self.phase.is_simulating() {
            return self.update_phase(now_ms);
        }
        self.tick += 1;

        // Input.
        physics::apply_input(&mut self.player, intent.movement, &self.config.physics);
        if intent.attack {
            combat::begin_swing(&mut self.player);
        }
        if self.player.action() != Action::Attacking {
            let resting = self.player.default_action();
            self.player.set_action(resting);
        }

        // Physics.
        physics::step(&mut self.player, &self.config.physics, &self.config.world);
        for enemy in self.roster.iter_mut() {
            ai::patrol(enemy, &self.config.enemy, &self.config.world, &mut self.rng);
            physics::step(enemy, &self.config.physics, &self.config.world);
        }

        // Animation.
        animation::advance(&mut self.player, &self.player_sheet, now_ms);
        for enemy in self.roster.iter_mut() {
            animation::advance(enemy, &self.enemy_sheet, now_ms);
        }

        // Combat.
        let report = combat::resolve(
            &mut self.player,
            self.roster.iter_mut(),
            &self.config.combat,
            now_ms,
        );
        if report.hits > 0 {
            self.score += report.kills;
            log::debug!(
                "Swing landed: {} hit(s), {} kill(s), score {}",
                report.hits,
                report.kills,
                self.score
            );
        }

        // Spawn.
        if self.phase.spawning_enabled() {
            self.replenish();
        }

        // Camera.
        self.viewport = Viewport::track(
            self.player.pos.x,
            self.player.size.x,
            self.player.size.y,
            &self.config.viewport,
            &self.config.world,
        );

        self.update_phase(now_ms)
    }

    /// Resume a saved round. The phase restarts `Active` with the saved
    /// countdown.
    pub fn restore(&mut self, snapshot: &WorldSnapshot, now_ms: u64) -> Result<(), String> {
        if snapshot.enemies.len() > self.roster.capacity() {
            return Err(format!(
                "Cannot restore {} enemies into a roster of {}",
                snapshot.enemies.len(),
                self.roster.capacity()
            ));
        }
        self.phase
            .resume(snapshot.phase_index, snapshot.timer_secs, now_ms)?;
        self.player = snapshot.player.to_entity();
        self.roster.clear();
        for enemy in &snapshot.enemies {
            self.roster.insert(enemy.to_entity());
        }
        self.score = snapshot.score;
        self.tick = snapshot.tick;
        self.viewport = Viewport::track(
            self.player.pos.x,
            self.player.size.x,
            self.player.size.y,
            &self.config.viewport,
            &self.config.world,
        );
        log::info!(
            "Restored phase '{}' with {}s left, score {}",
            self.phase.current().label,
            self.phase.timer_secs(),
            self.score
        );
        Ok(())
    }

    fn update_phase(&mut self, now_ms: u64) -> StepOutcome {
        match self.phase.update(now_ms) {
            Some(PhaseEvent::PhaseLoaded { index }) => {
                log::debug!("Resetting roster for phase {}", index + 1);
                self.roster.clear();
                self.replenish();
            }
            Some(PhaseEvent::TimerTick { remaining }) => log::trace!("{}s left", remaining),
            _ => {}
        }
        if self.phase.state() == PhaseState::RoundOver {
            StepOutcome::RoundOver(self.round_result())
        } else {
            StepOutcome::Running
        }
    }

    fn replenish(&mut self) {
        let spawned = self.spawner.replenish(
            &mut self.roster,
            self.phase.current(),
            self.viewport.origin.x,
            &mut self.rng,
        );
        if spawned > 0 {
            log::debug!(
                "Replenished {} enemies for '{}' ({} living)",
                spawned,
                self.phase.current().label,
                self.roster.living_count()
            );
        }
    }
}
