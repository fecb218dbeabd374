use brawl_core::input::Key;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use crate::driver::{InputEvent, InputSource};

#[derive(Debug, Deserialize, Clone)]
pub struct ReplaySequence {
    /// Overrides the config tick when set.
    #[serde(default)]
    pub tick_ms: Option<u64>,
    /// Send a quit once the frames run out instead of idling until the
    /// round ends.
    #[serde(default)]
    pub quit_at_end: bool,
    pub frames: Vec<ReplayFrame>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReplayFrame {
    #[serde(default)]
    pub press: Vec<String>,
    #[serde(default)]
    pub release: Vec<String>,
    #[serde(default = "default_repeat")]
    pub repeat: u32,
}

impl ReplaySequence {
    /// One event batch per tick. A frame's events land on its first tick,
    /// the remaining `repeat - 1` ticks are quiet. Releases come first.
    pub fn expanded_events(&self) -> Vec<Vec<InputEvent>> {
        let mut out = Vec::new();
        for frame in &self.frames {
            let batch: Vec<InputEvent> = frame
                .release
                .iter()
                .filter_map(|name| Key::from_name(name))
                .map(InputEvent::KeyUp)
                .chain(
                    frame
                        .press
                        .iter()
                        .filter_map(|name| Key::from_name(name))
                        .map(InputEvent::KeyDown),
                )
                .collect();
            out.push(batch);
            for _ in 1..frame.repeat.max(1) {
                out.push(Vec::new());
            }
        }
        out
    }
}

pub fn load_replay_from_path(path: &Path) -> Result<ReplaySequence, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let replay: ReplaySequence = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse replay JSON {}: {e}", path.display()))?;
    validate_replay(&replay)?;
    Ok(replay)
}

fn validate_replay(replay: &ReplaySequence) -> Result<(), String> {
    if replay.tick_ms == Some(0) {
        return Err("Replay validation failed: tick_ms must be > 0".to_string());
    }
    if replay.frames.is_empty() {
        return Err("Replay validation failed: frames list is empty".to_string());
    }
    for (i, frame) in replay.frames.iter().enumerate() {
        for name in frame.press.iter().chain(frame.release.iter()) {
            if Key::from_name(name).is_none() {
                return Err(format!(
                    "Replay validation failed: frames[{}] names unknown key '{}'",
                    i, name
                ));
            }
        }
    }
    Ok(())
}

/// Plays a replay back one batch per poll.
pub struct ReplayInput {
    batches: VecDeque<Vec<InputEvent>>,
    quit_at_end: bool,
}

impl ReplayInput {
    pub fn new(replay: &ReplaySequence) -> Self {
        Self {
            batches: replay.expanded_events().into(),
            quit_at_end: replay.quit_at_end,
        }
    }
}

impl InputSource for ReplayInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        match self.batches.pop_front() {
            Some(batch) => batch,
            None if self.quit_at_end => vec![InputEvent::Quit],
            None => Vec::new(),
        }
    }
}

const fn default_repeat() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{SheetRegistry, HERO_SHEET};
    use crate::choices::InputScheme;
    use crate::config::GameConfig;
    use crate::driver::{FrameLoop, LoopExit, Presenter};
    use crate::render::FrameView;
    use crate::world::World;
    use brawl_core::time::ManualClock;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "brawl_replay_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    struct NullPresenter;

    impl Presenter for NullPresenter {
        fn present(&mut self, _frame: &FrameView) {}
    }

    #[test]
    fn replay_file_parses_and_expands() {
        let path = temp_file_path("parse");
        fs::write(
            &path,
            r#"{
              "tick_ms": 16,
              "frames": [
                { "press": ["right"], "repeat": 3 },
                { "release": ["right"], "press": ["k"] }
              ]
            }"#,
        )
        .expect("write replay file");

        let replay = load_replay_from_path(&path).expect("replay should load");
        let expanded = replay.expanded_events();
        assert_eq!(expanded.len(), 4);
        assert_eq!(expanded[0], vec![InputEvent::KeyDown(Key::Right)]);
        assert!(expanded[1].is_empty());
        assert_eq!(
            expanded[3],
            vec![InputEvent::KeyUp(Key::Right), InputEvent::KeyDown(Key::K)]
        );

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unknown_key_is_rejected() {
        let path = temp_file_path("badkey");
        fs::write(&path, r#"{ "frames": [ { "press": ["f13"] } ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("f13 should fail");
        assert!(err.contains("unknown key 'f13'"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let path = temp_file_path("zerotick");
        fs::write(&path, r#"{ "tick_ms": 0, "frames": [ {} ] }"#).expect("write replay file");
        let err = load_replay_from_path(&path).expect_err("tick 0 should fail");
        assert!(err.contains("tick_ms must be > 0"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn quit_at_end_sends_quit_once_drained() {
        let replay = ReplaySequence {
            tick_ms: None,
            quit_at_end: true,
            frames: vec![ReplayFrame {
                press: vec![],
                release: vec![],
                repeat: 2,
            }],
        };
        let mut input = ReplayInput::new(&replay);
        assert_eq!(input.batches.len(), 2);
        assert!(input.poll().is_empty());
        assert!(input.poll().is_empty());
        assert_eq!(input.poll(), vec![InputEvent::Quit]);
    }

    fn run_replay(replay: &ReplaySequence) -> World {
        let registry = SheetRegistry::with_builtin();
        let world = World::new(GameConfig::default(), &registry, HERO_SHEET, 99, 0).expect("world");
        let mut driver =
            FrameLoop::new(world, InputScheme::Arrows.bindings(), 16, ManualClock::new(0));
        let mut input = ReplayInput::new(replay);
        assert_eq!(driver.run(&mut input, &mut NullPresenter), LoopExit::Quit);
        driver.world
    }

    #[test]
    fn replay_run_is_deterministic() {
        let replay: ReplaySequence = serde_json::from_str(
            r#"{
              "quit_at_end": true,
              "frames": [
                { "press": ["right"], "repeat": 60 },
                { "press": ["up"], "repeat": 30 },
                { "release": ["up"], "press": ["k"], "repeat": 40 },
                { "release": ["k", "right"], "press": ["left"], "repeat": 45 },
                { "press": ["k"], "repeat": 40 }
              ]
            }"#,
        )
        .expect("replay json");

        let run_a = run_replay(&replay);
        let run_b = run_replay(&replay);

        assert_eq!(run_a.player.pos, run_b.player.pos);
        assert_eq!(run_a.player.vel, run_b.player.vel);
        assert_eq!(run_a.score, run_b.score);
        assert_eq!(run_a.tick, run_b.tick);
        let enemies_a: Vec<_> = run_a.roster.iter().map(|e| (e.pos, e.hp)).collect();
        let enemies_b: Vec<_> = run_b.roster.iter().map(|e| (e.pos, e.hp)).collect();
        assert_eq!(enemies_a, enemies_b);
    }
}
