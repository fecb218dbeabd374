//! Sheet registry and the per-entity animation clock.
//!
//! Wraps the core `SheetSet`/`AnimationClip` types from `brawl_core::animation`
//! with a registry of every sheet set the round may draw, plus the rules that
//! tie an entity's action to clip playback.

use std::collections::HashMap;
use std::path::Path;

use brawl_core::animation::{
    load_sheet_set, AnimationClip, NativeFacing, SheetSet, SHEET_FORMAT_VERSION,
};

use crate::entity::{Action, Entity};

pub const HERO_SHEET: &str = "hero";
pub const HERO_ALT_SHEET: &str = "hero_alt";
pub const GRUNT_SHEET: &str = "grunt";

/// Used when a sheet lacks the clip for an action: a single held frame.
const FALLBACK_CLIP: AnimationClip = AnimationClip::one_shot(1, 1, 0, 0);

/// Registry of sheet sets keyed by `sheet_id`.
pub struct SheetRegistry {
    sheets: HashMap<String, SheetSet>,
}

impl SheetRegistry {
    pub fn new() -> Self {
        Self {
            sheets: HashMap::new(),
        }
    }

    /// Registry pre-filled with the two player appearances and the grunt.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.insert(hero_sheet(HERO_SHEET));
        registry.insert(hero_sheet(HERO_ALT_SHEET));
        registry.insert(grunt_sheet());
        registry
    }

    pub fn insert(&mut self, sheet: SheetSet) {
        self.sheets.insert(sheet.sheet_id.clone(), sheet);
    }

    /// Load a sheet-set file. A set with an existing id replaces it.
    pub fn load_file(&mut self, path: &Path) -> Result<(), String> {
        let sheet = load_sheet_set(path)?;
        log::info!(
            "Loaded sheet set '{}' ({} clips) from {}",
            sheet.sheet_id,
            sheet.clips.len(),
            path.display()
        );
        self.insert(sheet);
        Ok(())
    }

    pub fn get(&self, sheet_id: &str) -> Option<&SheetSet> {
        self.sheets.get(sheet_id)
    }

    pub fn resolve_clip(&self, sheet_id: &str, action: Action) -> Option<&AnimationClip> {
        self.get(sheet_id)
            .and_then(|sheet| sheet.clips.get(action.clip_name()))
    }

    /// Check that `sheet_id` exists and has every clip in `clips`.
    pub fn validate_required(&self, sheet_id: &str, clips: &[&str]) -> Result<(), String> {
        let sheet = self
            .get(sheet_id)
            .ok_or_else(|| format!("Sheet set '{}' is not registered", sheet_id))?;
        for name in clips {
            if !sheet.clips.contains_key(*name) {
                return Err(format!(
                    "Sheet set '{}' is missing required clip '{}'",
                    sheet_id, name
                ));
            }
        }
        Ok(())
    }
}

impl Default for SheetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn clip_for<'a>(sheet: &'a SheetSet, action: Action) -> &'a AnimationClip {
    sheet
        .clips
        .get(action.clip_name())
        .unwrap_or(&FALLBACK_CLIP)
}

/// Advance `entity`'s animation by one logical tick and apply the action
/// transitions that depend on clip completion or hurt expiry.
pub fn advance(entity: &mut Entity, sheet: &SheetSet, now_ms: u64) {
    let action = entity.action();
    let clip = clip_for(sheet, action);
    match action {
        Action::Idle => {
            entity.anim.tick(clip);
        }
        Action::Walking => {
            if entity.vel.x != 0 && entity.grounded {
                entity.anim.tick(clip);
            } else {
                entity.anim.restart();
            }
        }
        Action::Attacking => {
            if entity.anim.tick(clip).finished_now {
                entity.swing = None;
                let next = entity.default_action();
                entity.set_action(next);
            }
        }
        Action::Hurt => {
            entity.anim.tick(clip);
            let expired = entity.hurt_until_ms.map_or(true, |until| now_ms >= until);
            if expired {
                entity.hurt_until_ms = None;
                let next = entity.default_action();
                entity.set_action(next);
            }
        }
        Action::Dying => {
            if entity.anim.tick(clip).finished_now {
                log::debug!("Enemy at x={} finished dying", entity.pos.x);
                entity.set_action(Action::Dead);
            }
        }
        Action::Dead => {}
    }
}

fn hero_sheet(sheet_id: &str) -> SheetSet {
    let clips = [
        ("idle", AnimationClip::looping(1, 6, 71, 79)),
        ("walk", AnimationClip::looping(9, 6, 71, 79)),
        ("attack", AnimationClip::one_shot(6, 6, 121, 79)),
    ];
    SheetSet {
        version: SHEET_FORMAT_VERSION.to_string(),
        sheet_id: sheet_id.to_string(),
        native_facing: NativeFacing::Right,
        clips: clips
            .into_iter()
            .map(|(name, clip)| (name.to_string(), clip))
            .collect(),
    }
}

fn grunt_sheet() -> SheetSet {
    let clips = [
        ("idle", AnimationClip::looping(4, 5, 60, 80)),
        ("walk", AnimationClip::looping(4, 5, 60, 80)),
        ("hurt", AnimationClip::one_shot(1, 6, 60, 80)),
        ("death", AnimationClip::one_shot(4, 6, 60, 80)),
    ];
    SheetSet {
        version: SHEET_FORMAT_VERSION.to_string(),
        sheet_id: GRUNT_SHEET.to_string(),
        native_facing: NativeFacing::Left,
        clips: clips
            .into_iter()
            .map(|(name, clip)| (name.to_string(), clip))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Facing, Swing};
    use glam::IVec2;
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file_path(name_hint: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "brawl_sheetreg_test_{}_{}_{}.json",
            name_hint,
            std::process::id(),
            nanos
        ))
    }

    fn hero() -> Entity {
        Entity::player(IVec2::new(100, 731), IVec2::new(71, 79))
    }

    fn grunt() -> Entity {
        Entity::enemy(IVec2::new(400, 730), IVec2::new(60, 80), 2, Facing::Left)
    }

    #[test]
    fn builtin_sets_have_required_clips() {
        let registry = SheetRegistry::with_builtin();
        registry
            .validate_required(HERO_SHEET, &["idle", "walk", "attack"])
            .expect("hero clips");
        registry
            .validate_required(HERO_ALT_SHEET, &["idle", "walk", "attack"])
            .expect("hero_alt clips");
        registry
            .validate_required(GRUNT_SHEET, &["walk", "hurt", "death"])
            .expect("grunt clips");
        let attack = registry
            .resolve_clip(HERO_SHEET, Action::Attacking)
            .expect("attack clip");
        assert_eq!(attack.frames, 6);
        assert_eq!(attack.frame_w, 121);
    }

    #[test]
    fn validate_required_reports_missing_clip() {
        let registry = SheetRegistry::with_builtin();
        let err = registry
            .validate_required(HERO_SHEET, &["death"])
            .expect_err("hero has no death clip");
        assert!(err.contains("missing required clip 'death'"));
        let err = registry
            .validate_required("ghost", &["idle"])
            .expect_err("unknown sheet");
        assert!(err.contains("not registered"));
    }

    #[test]
    fn loaded_file_overrides_builtin() {
        let path = temp_file_path("override");
        fs::write(
            &path,
            r#"{
              "version": "0.1",
              "sheet_id": "hero",
              "clips": {
                "idle": { "frames": 2, "frame_w": 64, "frame_h": 64, "looping": true },
                "walk": { "frames": 8, "frame_w": 64, "frame_h": 64, "looping": true },
                "attack": { "frames": 5, "ticks_per_frame": 4, "frame_w": 96, "frame_h": 64 }
              }
            }"#,
        )
        .expect("write temp file");

        let mut registry = SheetRegistry::with_builtin();
        registry.load_file(&path).expect("should load");
        let walk = registry
            .resolve_clip(HERO_SHEET, Action::Walking)
            .expect("walk clip");
        assert_eq!(walk.frames, 8);
        // Other sets are untouched.
        assert!(registry.get(HERO_ALT_SHEET).is_some());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn attack_returns_to_idle_after_last_frame() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(HERO_SHEET).expect("hero");
        let mut player = hero();
        player.set_action(Action::Attacking);
        player.swing = Some(Swing::default());

        for _ in 0..35 {
            advance(&mut player, sheet, 0);
            assert_eq!(player.action(), Action::Attacking);
        }
        advance(&mut player, sheet, 0);
        assert_eq!(player.action(), Action::Idle);
        assert!(player.swing.is_none());
    }

    #[test]
    fn attack_ends_in_walk_when_still_moving() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(HERO_SHEET).expect("hero");
        let mut player = hero();
        player.vel.x = 5;
        player.set_action(Action::Attacking);
        for _ in 0..36 {
            advance(&mut player, sheet, 0);
        }
        assert_eq!(player.action(), Action::Walking);
    }

    #[test]
    fn walk_only_advances_while_moving_on_ground() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(HERO_SHEET).expect("hero");
        let mut player = hero();
        player.vel.x = 5;
        player.set_action(Action::Walking);
        for _ in 0..12 {
            advance(&mut player, sheet, 0);
        }
        assert_eq!(player.anim.frame_index, 2);

        player.grounded = false;
        advance(&mut player, sheet, 0);
        assert_eq!(player.anim.frame_index, 0);
    }

    #[test]
    fn walk_wraps_after_nine_frames() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(HERO_SHEET).expect("hero");
        let mut player = hero();
        player.vel.x = -5;
        player.set_action(Action::Walking);
        for _ in 0..(9 * 6) {
            advance(&mut player, sheet, 0);
            assert!(player.anim.frame_index < 9);
        }
        assert_eq!(player.anim.frame_index, 0);
    }

    #[test]
    fn hurt_expires_on_wall_clock() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(GRUNT_SHEET).expect("grunt");
        let mut enemy = grunt();
        enemy.stagger(1200);
        advance(&mut enemy, sheet, 1100);
        assert_eq!(enemy.action(), Action::Hurt);
        advance(&mut enemy, sheet, 1200);
        assert_eq!(enemy.action(), Action::Idle);
        assert_eq!(enemy.hurt_until_ms, None);
    }

    #[test]
    fn dying_holds_then_becomes_dead() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(GRUNT_SHEET).expect("grunt");
        let mut enemy = grunt();
        enemy.apply_damage(2);
        for _ in 0..23 {
            advance(&mut enemy, sheet, 0);
            assert_eq!(enemy.action(), Action::Dying);
            assert!(enemy.anim.frame_index < 4);
        }
        advance(&mut enemy, sheet, 0);
        assert_eq!(enemy.action(), Action::Dead);
    }

    #[test]
    fn missing_clip_falls_back_to_single_frame() {
        let registry = SheetRegistry::with_builtin();
        let sheet = registry.get(HERO_SHEET).expect("hero");
        assert_eq!(clip_for(sheet, Action::Hurt).frames, 1);
    }
}
