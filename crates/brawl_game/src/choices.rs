//! Menu selections handed to the round: which sprite set the player wears
//! and which keys drive it.
//!
//! The menu writes a small `key=value` file:
//!
//! ```text
//! appearance=1
//! input=0
//! ```

use brawl_core::input::{InputState, Key};
use std::fs;
use std::path::Path;

use crate::animation::{HERO_ALT_SHEET, HERO_SHEET};
use crate::entity::Facing;
use crate::physics::ControllerInput;
use crate::world::TickIntent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Appearance {
    #[default]
    Hero,
    HeroAlt,
}

impl Appearance {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Hero),
            1 => Some(Self::HeroAlt),
            _ => None,
        }
    }

    pub fn sheet_id(self) -> &'static str {
        match self {
            Self::Hero => HERO_SHEET,
            Self::HeroAlt => HERO_ALT_SHEET,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputScheme {
    /// Arrow keys move and jump, K attacks.
    #[default]
    Arrows,
    /// A/D move, W jumps, E attacks.
    Wasd,
}

impl InputScheme {
    pub fn from_index(index: u32) -> Option<Self> {
        match index {
            0 => Some(Self::Arrows),
            1 => Some(Self::Wasd),
            _ => None,
        }
    }

    pub fn bindings(self) -> KeyBindings {
        match self {
            Self::Arrows => KeyBindings {
                left: Key::Left,
                right: Key::Right,
                jump: Key::Up,
                attack: Key::K,
            },
            Self::Wasd => KeyBindings {
                left: Key::A,
                right: Key::D,
                jump: Key::W,
                attack: Key::E,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub left: Key,
    pub right: Key,
    pub jump: Key,
    pub attack: Key,
}

impl KeyBindings {
    fn direction_of(&self, key: Key) -> Option<Facing> {
        if key == self.right {
            Some(Facing::Right)
        } else if key == self.left {
            Some(Facing::Left)
        } else {
            None
        }
    }

    /// Fold one direction-key edge into this tick's movement. Edges must be
    /// folded in arrival order; the last one wins, so a key pressed and
    /// released inside one tick leaves only the stop.
    pub fn fold_edge(&self, movement: &mut ControllerInput, key: Key, down: bool) {
        let Some(direction) = self.direction_of(key) else {
            return;
        };
        if down {
            movement.press = Some(direction);
        } else {
            movement.press = None;
            movement.stop = true;
        }
    }

    /// Combine the folded movement with this tick's jump and attack edges.
    /// Keys outside the binding have no effect.
    pub fn intent(&self, input: &InputState, movement: ControllerInput) -> TickIntent {
        TickIntent {
            movement: ControllerInput {
                jump: input.is_just_pressed(self.jump),
                ..movement
            },
            attack: input.is_just_pressed(self.attack),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerChoices {
    pub appearance: Appearance,
    pub input_scheme: InputScheme,
}

pub fn parse_choices(raw: &str) -> Result<PlayerChoices, String> {
    let mut choices = PlayerChoices::default();
    for (line_no, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(format!(
                "Choices validation failed: line {} has no '='",
                line_no + 1
            ));
        };
        let key = key.trim();
        let parse_index = || {
            value.trim().parse::<u32>().map_err(|e| {
                format!(
                    "Choices validation failed: '{}' on line {} is not a number: {e}",
                    key,
                    line_no + 1
                )
            })
        };
        match key {
            "appearance" => {
                let index = parse_index()?;
                choices.appearance = Appearance::from_index(index).ok_or_else(|| {
                    format!(
                        "Choices validation failed: appearance {} is out of range",
                        index
                    )
                })?;
            }
            "input" => {
                let index = parse_index()?;
                choices.input_scheme = InputScheme::from_index(index).ok_or_else(|| {
                    format!("Choices validation failed: input {} is out of range", index)
                })?;
            }
            other => log::debug!("Ignoring unknown choice '{}'", other),
        }
    }
    Ok(choices)
}

/// Read the menu's choices. A missing file means the menu was skipped.
pub fn load_choices_from_path(path: &Path) -> Result<PlayerChoices, String> {
    if !path.exists() {
        log::warn!(
            "Choices file {} not found, using defaults",
            path.display()
        );
        return Ok(PlayerChoices::default());
    }
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    parse_choices(&raw)
}
