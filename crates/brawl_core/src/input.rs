//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` is true every tick the key is
//!   physically down. The frame loop reads it to tell a fresh key-down from a
//!   platform repeat.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only during the
//!   tick the transition happened. Jump and attack read `is_just_pressed`.
//!   Both sets are cleared by `end_frame()` after the simulation step has
//!   consumed them.
//!
//! The sets lose the order of edges inside one tick, so direction keys are
//! folded from the raw events by the frame loop instead, and quit is taken
//! from the raw Escape key-down before it ever reaches this state.
//!
//! Key-repeat events from the platform arrive as repeated key-downs; they are
//! absorbed here because `held` already contains the key.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    W,
    A,
    S,
    D,
    E,
    K,
    Space,
    Enter,
    Escape,
}

impl Key {
    pub const ALL: &'static [Key] = &[
        Key::Left,
        Key::Right,
        Key::Up,
        Key::Down,
        Key::W,
        Key::A,
        Key::S,
        Key::D,
        Key::E,
        Key::K,
        Key::Space,
        Key::Enter,
        Key::Escape,
    ];

    /// Lowercase name used by replay files.
    pub fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
            Self::W => "w",
            Self::A => "a",
            Self::S => "s",
            Self::D => "d",
            Self::E => "e",
            Self::K => "k",
            Self::Space => "space",
            Self::Enter => "enter",
            Self::Escape => "escape",
        }
    }

    pub fn from_name(name: &str) -> Option<Key> {
        let lowered = name.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|key| key.name() == lowered)
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,

    pub mouse_position: (i32, i32),
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
            mouse_position: (0, 0),
        }
    }

    pub fn key_down(&mut self, key: Key) {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Track the pointer, dropping coordinates outside `bounds` (width, height).
    pub fn mouse_moved(&mut self, x: i32, y: i32, bounds: (u32, u32)) -> bool {
        let inside = x >= 0 && y >= 0 && (x as u32) < bounds.0 && (y as u32) < bounds.1;
        if inside {
            self.mouse_position = (x, y);
        }
        inside
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::K);
        assert!(input.is_held(Key::K));
        assert!(input.is_just_pressed(Key::K));
    }

    #[test]
    fn key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_up(Key::Left);
        assert!(!input.is_held(Key::Left));
        assert!(input.is_just_released(Key::Left));
    }

    #[test]
    fn key_repeat_is_absorbed() {
        let mut input = InputState::new();
        input.key_down(Key::K);
        input.end_frame();
        // Platform auto-repeat while the key stays down.
        input.key_down(Key::K);
        assert!(input.is_held(Key::K));
        assert!(!input.is_just_pressed(Key::K));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::Right);
        assert!(!input.is_just_released(Key::Right));
        assert!(!input.is_held(Key::Right));
    }

    #[test]
    fn end_frame_clears_edges_but_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::A));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::A));
        assert!(input.is_held(Key::Space));

        input.key_up(Key::A);
        input.end_frame();
        assert!(!input.is_just_released(Key::A));
    }

    #[test]
    fn tap_within_one_tick_keeps_both_edges_but_not_held() {
        let mut input = InputState::new();
        input.key_down(Key::Right);
        input.key_up(Key::Right);
        // Both edges survive; their order does not.
        assert!(input.is_just_pressed(Key::Right));
        assert!(input.is_just_released(Key::Right));
        assert!(!input.is_held(Key::Right));
    }

    #[test]
    fn mouse_outside_bounds_is_ignored() {
        let mut input = InputState::new();
        assert!(input.mouse_moved(100, 200, (1280, 720)));
        assert_eq!(input.mouse_position, (100, 200));

        assert!(!input.mouse_moved(-5, 10, (1280, 720)));
        assert!(!input.mouse_moved(1280, 10, (1280, 720)));
        assert_eq!(input.mouse_position, (100, 200));
    }

    #[test]
    fn key_names_round_trip_case_insensitively() {
        for &key in Key::ALL {
            assert_eq!(Key::from_name(key.name()), Some(key));
        }
        assert_eq!(Key::from_name(" LEFT "), Some(Key::Left));
        assert_eq!(Key::from_name("f13"), None);
    }
}
