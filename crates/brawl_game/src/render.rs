//! Backend-neutral frame description.
//!
//! The core never touches pixels. Each tick it turns the world into a
//! `FrameView`: source rectangles on the sprite sheets, destination
//! rectangles in screen space, the HUD text and the fade overlay. A
//! `Presenter` decides what to do with it.

use brawl_core::animation::{NativeFacing, SheetSet};

use crate::animation::clip_for;
use crate::camera::Viewport;
use crate::combat::Rect;
use crate::entity::{Entity, Facing};
use crate::world::World;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteDraw {
    pub sheet_id: String,
    pub clip: &'static str,
    pub frame_index: usize,
    /// Rectangle on the sheet.
    pub src: Rect,
    /// Rectangle on screen.
    pub dst: Rect,
    /// Draw flipped horizontally.
    pub mirrored: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FadeOverlay {
    pub alpha: u8,
    pub banner: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameView {
    pub tick: u64,
    pub camera: Viewport,
    /// Part of the scrolling background to blit at the screen origin.
    pub background_src: Rect,
    /// Back to front: enemies, then the player.
    pub sprites: Vec<SpriteDraw>,
    pub timer_text: String,
    pub score_text: String,
    pub fade: Option<FadeOverlay>,
}

pub fn build_frame(world: &World) -> FrameView {
    let camera = world.viewport;
    let mut sprites: Vec<SpriteDraw> = world
        .roster
        .iter()
        .map(|enemy| sprite_draw(enemy, world.enemy_sheet(), &camera))
        .collect();
    sprites.push(sprite_draw(&world.player, world.player_sheet(), &camera));

    let alpha = world.phase.fade_alpha();
    let fade = (alpha > 0).then(|| FadeOverlay {
        alpha,
        banner: world.phase.banner().map(str::to_string),
    });

    FrameView {
        tick: world.tick,
        camera,
        background_src: camera.rect(),
        sprites,
        timer_text: format!("{:02}", world.phase.timer_secs()),
        score_text: format!("Score: {}", world.score),
        fade,
    }
}

fn sprite_draw(entity: &Entity, sheet: &SheetSet, camera: &Viewport) -> SpriteDraw {
    let action = entity.action();
    let clip = clip_for(sheet, action);
    let (sx, sy, sw, sh) = clip.source_rect(entity.anim.frame_index);
    // Frames wider than the body (the attack swing) extend forward, so a
    // left-facing wide frame is shifted back by the extra width.
    let extra = (sw - entity.size.x).max(0);
    let dst_x = match entity.facing {
        Facing::Right => entity.pos.x,
        Facing::Left => entity.pos.x - extra,
    };
    let screen = camera.to_screen(glam::IVec2::new(dst_x, entity.bottom() - sh));
    SpriteDraw {
        sheet_id: sheet.sheet_id.clone(),
        clip: action.clip_name(),
        frame_index: entity.anim.frame_index,
        src: Rect::new(sx, sy, sw, sh),
        dst: Rect::new(screen.x, screen.y, sw, sh),
        mirrored: is_mirrored(sheet.native_facing, entity.facing),
    }
}

fn is_mirrored(native: NativeFacing, facing: Facing) -> bool {
    matches!(
        (native, facing),
        (NativeFacing::Right, Facing::Left) | (NativeFacing::Left, Facing::Right)
    )
}
