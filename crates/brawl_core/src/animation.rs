//! Sprite-sheet animation clips and deterministic tick-based advancement.
//!
//! A clip is a horizontal strip of equally sized frames on one bitmap sheet.
//! Timing is counted in logical ticks (`ticks_per_frame`), never in wall-clock
//! time, so animation cadence is identical for every run of the same input.
//!
//! Sheet sets are described in JSON, one file per character appearance. The
//! decoded bitmaps themselves belong to the asset provider; this module only
//! knows frame counts and frame sizes.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const SHEET_FORMAT_VERSION: &str = "0.1";

/// One action's frame strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationClip {
    pub frames: usize,
    pub ticks_per_frame: u32,
    pub frame_w: i32,
    pub frame_h: i32,
    pub looping: bool,
}

impl AnimationClip {
    pub const fn looping(frames: usize, ticks_per_frame: u32, frame_w: i32, frame_h: i32) -> Self {
        Self {
            frames,
            ticks_per_frame,
            frame_w,
            frame_h,
            looping: true,
        }
    }

    pub const fn one_shot(frames: usize, ticks_per_frame: u32, frame_w: i32, frame_h: i32) -> Self {
        Self {
            frames,
            ticks_per_frame,
            frame_w,
            frame_h,
            looping: false,
        }
    }

    /// Ticks needed to play a one-shot clip to completion.
    pub fn total_ticks(&self) -> u64 {
        self.frames as u64 * self.ticks_per_frame as u64
    }

    /// Source rectangle `(x, y, w, h)` of `frame_index` on the sheet.
    pub fn source_rect(&self, frame_index: usize) -> (i32, i32, i32, i32) {
        let index = frame_index.min(self.frames.saturating_sub(1)) as i32;
        (index * self.frame_w, 0, self.frame_w, self.frame_h)
    }
}

/// Which way the artwork on a sheet faces before any mirroring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NativeFacing {
    Left,
    #[default]
    Right,
}

/// All clips for one character appearance, keyed by action name.
#[derive(Debug, Clone)]
pub struct SheetSet {
    pub version: String,
    pub sheet_id: String,
    pub native_facing: NativeFacing,
    pub clips: HashMap<String, AnimationClip>,
}

/// What happened during one `AnimationState::tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStep {
    pub advanced: bool,
    pub finished_now: bool,
}

/// Runtime state for one playing clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationState {
    pub frame_index: usize,
    pub elapsed_ticks: u32,
    pub finished: bool,
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn restart(&mut self) {
        *self = Self::default();
    }

    /// Advance by one logical tick. Looping clips wrap; one-shot clips hold
    /// on their last frame and report `finished_now` exactly once.
    pub fn tick(&mut self, clip: &AnimationClip) -> FrameStep {
        if clip.frames == 0 || self.finished {
            return FrameStep::default();
        }

        self.elapsed_ticks += 1;
        if self.elapsed_ticks < clip.ticks_per_frame.max(1) {
            return FrameStep::default();
        }

        self.elapsed_ticks = 0;
        self.frame_index += 1;
        if self.frame_index >= clip.frames {
            if clip.looping {
                self.frame_index = 0;
            } else {
                self.frame_index = clip.frames - 1;
                self.finished = true;
                return FrameStep {
                    advanced: false,
                    finished_now: true,
                };
            }
        }

        FrameStep {
            advanced: true,
            finished_now: false,
        }
    }
}

// --- JSON deserialization types (private) ---

#[derive(Debug, Deserialize)]
struct SheetSetJson {
    version: String,
    sheet_id: String,
    #[serde(default)]
    native_facing: NativeFacing,
    clips: HashMap<String, AnimationClipJson>,
}

#[derive(Debug, Deserialize)]
struct AnimationClipJson {
    frames: usize,
    #[serde(default = "default_ticks_per_frame")]
    ticks_per_frame: u32,
    frame_w: i32,
    frame_h: i32,
    #[serde(default)]
    looping: bool,
}

/// Load a sheet-set description from disk.
pub fn load_sheet_set(path: &Path) -> Result<SheetSet, String> {
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read sheet set {}: {e}", path.display()))?;
    let json: SheetSetJson = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse sheet set {}: {e}", path.display()))?;
    validate_sheet_json(&json)?;

    let clips = json
        .clips
        .into_iter()
        .map(|(name, clip)| {
            (
                name,
                AnimationClip {
                    frames: clip.frames,
                    ticks_per_frame: clip.ticks_per_frame,
                    frame_w: clip.frame_w,
                    frame_h: clip.frame_h,
                    looping: clip.looping,
                },
            )
        })
        .collect();

    Ok(SheetSet {
        version: json.version,
        sheet_id: json.sheet_id,
        native_facing: json.native_facing,
        clips,
    })
}

fn validate_sheet_json(json: &SheetSetJson) -> Result<(), String> {
    if json.version != SHEET_FORMAT_VERSION {
        return Err(format!(
            "Sheet validation failed: unsupported version '{}'",
            json.version
        ));
    }
    if json.sheet_id.is_empty() {
        return Err("Sheet validation failed: sheet_id is empty".to_string());
    }
    if json.clips.is_empty() {
        return Err(format!(
            "Sheet validation failed: sheet '{}' has no clips",
            json.sheet_id
        ));
    }
    for (name, clip) in &json.clips {
        if clip.frames == 0 {
            return Err(format!(
                "Sheet validation failed: clip '{}' has no frames",
                name
            ));
        }
        if clip.ticks_per_frame == 0 {
            return Err(format!(
                "Sheet validation failed: clip '{}' has zero ticks_per_frame",
                name
            ));
        }
        if clip.frame_w <= 0 || clip.frame_h <= 0 {
            return Err(format!(
                "Sheet validation failed: clip '{}' frame size must be > 0",
                name
            ));
        }
    }
    Ok(())
}

const fn default_ticks_per_frame() -> u32 {
    6
}
