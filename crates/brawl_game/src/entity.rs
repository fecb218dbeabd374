//! Player and enemy share one entity type.
//!
//! `EntityKind` is the discriminant: both kinds run through the same physics,
//! animation and combat code, and capability checks such as
//! `EntityKind::takes_damage` replace per-type loop duplication.

use brawl_core::animation::AnimationState;
use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::combat::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Player,
    Enemy,
}

impl EntityKind {
    /// The player is invulnerable in this game; only enemies lose hp.
    pub fn takes_damage(self) -> bool {
        matches!(self, Self::Enemy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    pub fn sign(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Exactly one action is active per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Idle,
    Walking,
    Attacking,
    Hurt,
    Dying,
    /// Death animation finished; the roster slot may be reused.
    Dead,
}

impl Action {
    /// Sheet clip that renders this action.
    pub fn clip_name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Walking => "walk",
            Self::Attacking => "attack",
            Self::Hurt => "hurt",
            Self::Dying | Self::Dead => "death",
        }
    }

    pub fn is_alive(self) -> bool {
        !matches!(self, Self::Dying | Self::Dead)
    }
}

/// Latch for one attack activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Swing {
    pub resolved: bool,
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub kind: EntityKind,
    pub pos: IVec2,
    pub vel: IVec2,
    pub size: IVec2,
    pub facing: Facing,
    pub grounded: bool,
    action: Action,
    pub anim: AnimationState,
    pub hp: u32,
    pub hurt_until_ms: Option<u64>,
    pub swing: Option<Swing>,
}

impl Entity {
    pub fn player(pos: IVec2, size: IVec2) -> Self {
        Self::new(EntityKind::Player, pos, size, 1, Facing::Right)
    }

    pub fn enemy(pos: IVec2, size: IVec2, hp: u32, facing: Facing) -> Self {
        Self::new(EntityKind::Enemy, pos, size, hp, facing)
    }

    fn new(kind: EntityKind, pos: IVec2, size: IVec2, hp: u32, facing: Facing) -> Self {
        Self {
            kind,
            pos,
            vel: IVec2::ZERO,
            size,
            facing,
            grounded: true,
            action: Action::Idle,
            anim: AnimationState::new(),
            hp,
            hurt_until_ms: None,
            swing: None,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Switch action, restarting the animation only on an actual change.
    pub fn set_action(&mut self, action: Action) {
        if self.action != action {
            self.action = action;
            self.anim.restart();
        }
    }

    /// Resting action when nothing else is driving the entity.
    pub fn default_action(&self) -> Action {
        if self.vel.x != 0 {
            Action::Walking
        } else {
            Action::Idle
        }
    }

    pub fn is_alive(&self) -> bool {
        self.action.is_alive()
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    pub fn bottom(&self) -> i32 {
        self.pos.y + self.size.y
    }

    /// Subtract hp, flooring at zero. Returns true when this call killed the
    /// entity (hp went from above zero to zero); the entity is then Dying.
    pub fn apply_damage(&mut self, amount: u32) -> bool {
        if !self.is_alive() || !self.kind.takes_damage() || self.hp == 0 {
            return false;
        }
        self.hp = self.hp.saturating_sub(amount);
        if self.hp == 0 {
            self.vel.x = 0;
            self.hurt_until_ms = None;
            self.swing = None;
            self.set_action(Action::Dying);
            true
        } else {
            false
        }
    }

    pub fn stagger(&mut self, until_ms: u64) {
        if !self.is_alive() {
            return;
        }
        self.vel.x = 0;
        self.hurt_until_ms = Some(until_ms);
        self.set_action(Action::Hurt);
    }
}
