//! Hitbox-based melee resolution.
//!
//! A swing starts on a fresh attack press and resolves exactly once, on the
//! tick its animation sits on the configured active frame. The `Swing` latch
//! on the attacker makes the active frame fire once even though the frame is
//! displayed for several ticks, so a stationary target inside the hitbox
//! loses one hit per swing. Holding the attack key does not start new swings:
//! only a key-down edge does.
//!
//! Every living opponent overlapping the hitbox on that tick is damaged;
//! damage is independent per target, so iteration order does not matter.

use serde::Deserialize;

use crate::entity::{Action, Entity, Swing};

/// Axis-aligned integer rectangle in world pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Strict overlap: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.w
            && self.x + self.w > other.x
            && self.y < other.y + other.h
            && self.y + self.h > other.y
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StrikeShape {
    /// Box of `reach` width in front of the attacker, full attacker height.
    #[default]
    Reach,
    /// The attacker's own bounding box: hits whatever it is touching.
    Body,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct CombatConfig {
    /// Attack animation frame on which the hitbox is live.
    pub active_frame: usize,
    pub damage: u32,
    /// Stagger duration for targets that survive a hit.
    pub hurt_ms: u64,
    pub reach: i32,
    pub shape: StrikeShape,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            active_frame: 2,
            damage: 1,
            hurt_ms: 200,
            reach: 50,
            shape: StrikeShape::Reach,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StrikeReport {
    pub hits: u32,
    pub kills: u32,
}

/// Start a swing unless one is already in progress.
pub fn begin_swing(attacker: &mut Entity) -> bool {
    if !attacker.is_alive() || attacker.action() == Action::Attacking {
        return false;
    }
    attacker.set_action(Action::Attacking);
    attacker.swing = Some(Swing::default());
    true
}

pub fn strike_box(attacker: &Entity, config: &CombatConfig) -> Rect {
    match config.shape {
        StrikeShape::Body => attacker.bounds(),
        StrikeShape::Reach => {
            let x = if attacker.facing.sign() > 0 {
                attacker.pos.x + attacker.size.x
            } else {
                attacker.pos.x - config.reach
            };
            Rect::new(x, attacker.pos.y, config.reach, attacker.size.y)
        }
    }
}

/// Resolve the attacker's swing against `targets` if this is its active tick.
pub fn resolve<'a>(
    attacker: &mut Entity,
    targets: impl IntoIterator<Item = &'a mut Entity>,
    config: &CombatConfig,
    now_ms: u64,
) -> StrikeReport {
    let mut report = StrikeReport::default();
    if attacker.action() != Action::Attacking || attacker.anim.frame_index != config.active_frame {
        return report;
    }
    match attacker.swing.as_mut() {
        Some(swing) if !swing.resolved => swing.resolved = true,
        _ => return report,
    }

    let hitbox = strike_box(attacker, config);
    for target in targets {
        if target.kind == attacker.kind || !target.kind.takes_damage() || !target.is_alive() {
            continue;
        }
        if !hitbox.overlaps(&target.bounds()) {
            continue;
        }
        report.hits += 1;
        if target.apply_damage(config.damage) {
            report.kills += 1;
        } else {
            target.stagger(now_ms + config.hurt_ms);
        }
    }
    report
}
