//! Prism2D demo — a headless frame loop exercising the whole engine.
//!
//! Builds a context with a checkerboard tile atlas, drives two cameras
//! (one pixel-compositing, one recording draw calls) following a scripted
//! player, and fires the effect timers along the way. Per-frame statistics
//! go through the engine logger.

use std::cell::Cell;
use std::rc::Rc;

use prism_2d_engine::glam::{Affine2, Vec2};
use prism_2d_engine::prism2d::camera::{Camera, FollowStyle, FollowTarget, ShakeAxes};
use prism_2d_engine::prism2d::geom::{Color, Rect};
use prism_2d_engine::prism2d::render::{
    BatchedDrawBackend, BlendMode, FrameView, ImmediateCompositionBackend,
};
use prism_2d_engine::prism2d::resource::{Graphic, GraphicKey};
use prism_2d_engine::prism2d::{ContextConfig, Engine, Error, RenderContext};
use prism_2d_engine::{engine_info, engine_warn};

const TILE: f32 = 16.0;
const CAMERA_SIZE: i32 = 256;
const FRAMES: u32 = 180;
const STEP: f32 = 1.0 / 60.0;

/// Scripted player running a slow circle through the world.
struct Player {
    pos: Cell<Vec2>,
    last: Cell<Vec2>,
}

impl Player {
    fn new(start: Vec2) -> Rc<Self> {
        Rc::new(Self {
            pos: Cell::new(start),
            last: Cell::new(start),
        })
    }

    fn advance(&self, t: f32) {
        self.last.set(self.pos.get());
        let radius = 200.0;
        self.pos.set(Vec2::new(
            512.0 + radius * (t * 0.8).cos(),
            512.0 + radius * (t * 0.8).sin(),
        ));
    }
}

impl FollowTarget for Player {
    fn position(&self) -> Vec2 {
        self.pos.get()
    }

    fn size(&self) -> Vec2 {
        Vec2::new(TILE, TILE)
    }

    fn last_position(&self) -> Option<Vec2> {
        Some(self.last.get())
    }
}

/// 2x2-cell checkerboard atlas used for the world tiles.
fn build_atlas(ctx: &mut RenderContext) -> Result<GraphicKey, Error> {
    let size = TILE as u32 * 2;
    let mut pixels = Vec::with_capacity((size * size) as usize);
    for y in 0..size {
        for x in 0..size {
            let cell = (x / TILE as u32 + y / TILE as u32) % 2;
            let color = if cell == 0 {
                Color::from_rgb8(0x2E, 0x7D, 0x32)
            } else {
                Color::from_rgb8(0x1B, 0x5E, 0x20)
            };
            pixels.push(color.to_bits());
        }
    }
    ctx.graphics.insert(Graphic::new("atlas", size, size, pixels)?)
}

/// Draw the world tiles that touch the camera view, plus the player sprite.
fn draw_scene(camera: &mut Camera, ctx: &mut RenderContext, atlas: GraphicKey, player: &Player) {
    let view = camera.view_rect();
    let scroll = camera.scroll();

    let first_col = (view.x / TILE).floor() as i32;
    let last_col = (view.right() / TILE).ceil() as i32;
    let first_row = (view.y / TILE).floor() as i32;
    let last_row = (view.bottom() / TILE).ceil() as i32;

    for row in first_row..last_row {
        for col in first_col..last_col {
            let frame_x = if (col + row) % 2 == 0 { 0.0 } else { TILE };
            camera.draw_quad(
                ctx,
                atlas,
                Rect::new(frame_x, 0.0, TILE, TILE),
                Affine2::from_translation(Vec2::new(
                    col as f32 * TILE - scroll.x,
                    row as f32 * TILE - scroll.y,
                )),
                None,
                None,
                BlendMode::Normal,
                false,
                None,
            );
        }
    }

    // Player sprite: a tinted tile on top of the world.
    let player_view = player.position() - scroll;
    camera.draw_quad(
        ctx,
        atlas,
        Rect::new(0.0, 0.0, TILE, TILE),
        Affine2::from_translation(player_view),
        Some(Color::from_rgb8(0xFF, 0xD5, 0x4F)),
        None,
        BlendMode::Normal,
        false,
        None,
    );
}

fn main() -> Result<(), Error> {
    Engine::initialize()?;

    let mut ctx = RenderContext::new(ContextConfig {
        default_zoom: 1.0,
        default_camera_size: (CAMERA_SIZE, CAMERA_SIZE),
    });
    let atlas = build_atlas(&mut ctx)?;

    let mut world_camera = Camera::new(
        &ctx,
        CAMERA_SIZE,
        CAMERA_SIZE,
        1.0,
        Box::new(ImmediateCompositionBackend::new(1, 1)),
    );
    world_camera.set_background_color(Color::from_rgb8(0x10, 0x10, 0x18));
    world_camera.set_scroll_bounds(Some(0.0), Some(1024.0), Some(0.0), Some(1024.0));

    let mut gpu_camera = Camera::new(
        &ctx,
        CAMERA_SIZE,
        CAMERA_SIZE,
        1.0,
        Box::new(BatchedDrawBackend::new(1, 1)),
    );
    gpu_camera.set_background_color(Color::TRANSPARENT);

    let player = Player::new(Vec2::new(712.0, 512.0));
    world_camera.follow(player.clone(), FollowStyle::Platformer, 0.3);
    world_camera.set_lead(Vec2::new(0.5, 0.5));
    world_camera.snap_to_target();
    gpu_camera.follow(player.clone(), FollowStyle::TopDown, 1.0);

    for frame in 0..FRAMES {
        let t = frame as f32 * STEP;
        player.advance(t);

        // Scripted effects along the run.
        if frame == 30 {
            world_camera.flash(Color::WHITE.with_alpha(0.8), 0.4, None, false);
        }
        if frame == 60 {
            world_camera.shake(0.02, 0.5, None, true, ShakeAxes::XY);
        }
        if frame == 90 {
            world_camera.fade(
                Color::BLACK,
                0.5,
                false,
                Some(Box::new(|| engine_info!("prism2d_demo", "Fade-out complete"))),
                false,
            );
        }
        if frame == 130 {
            world_camera.fade(Color::BLACK, 0.5, true, None, false);
        }

        world_camera.update(STEP);
        gpu_camera.update(STEP);

        draw_scene(&mut world_camera, &mut ctx, atlas, &player);
        draw_scene(&mut gpu_camera, &mut ctx, atlas, &player);

        let world_stats = world_camera.render(&mut ctx)?;
        let gpu_stats = gpu_camera.render(&mut ctx)?;

        if frame % 30 == 0 {
            engine_info!(
                "prism2d_demo",
                "Frame {:3}: world {} calls / {} quads, gpu {} calls / {} quads, pool {} nodes",
                frame,
                world_stats.draw_calls,
                world_stats.quads,
                gpu_stats.draw_calls,
                gpu_stats.quads,
                ctx.pool.node_count()
            );
        }
    }

    // Show what each strategy produced on its final frame.
    match world_camera.backend().frame() {
        FrameView::Pixels { width, height, .. } => {
            engine_info!("prism2d_demo", "World camera composited a {}x{} frame", width, height);
        }
        FrameView::DrawCalls(_) => engine_warn!("prism2d_demo", "Unexpected output mode"),
    }
    match gpu_camera.backend().frame() {
        FrameView::DrawCalls(calls) => {
            engine_info!("prism2d_demo", "GPU camera recorded {} draw calls", calls.len());
        }
        FrameView::Pixels { .. } => engine_warn!("prism2d_demo", "Unexpected output mode"),
    }

    world_camera.release(&mut ctx);
    gpu_camera.release(&mut ctx);
    Engine::shutdown();
    Ok(())
}
