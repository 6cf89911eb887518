//! Camera — the aggregate root of the viewport pipeline.
//!
//! A Camera owns its transform state (`Viewport`), its follow controller,
//! its three effect timers, its draw stack and its render backend. Hosts
//! drive it once per frame: `update(elapsed)`, then draw submissions, then
//! `render(&mut ctx)` which plays the stack back in submission order,
//! composites effects, presents, and returns the nodes to the pool.

use std::rc::Rc;
use glam::{Affine2, Vec2};
use crate::camera::effects::{FadeEffect, FlashEffect, ShakeAxes, ShakeEffect};
use crate::camera::follow::{FollowState, FollowStyle, FollowTarget};
use crate::camera::viewport::Viewport;
use crate::color::{Color, ColorOffset};
use crate::context::RenderContext;
use crate::error::Result;
use crate::geom::Rect;
use crate::renderer::{
    BatchFlags, BatchGeometry, BatchKey, BlendMode, DrawStack, DrawStats, PlaybackParams,
    PresentParams, QuadGeom, RenderBackend, ShaderId,
};
use crate::resource::GraphicKey;

/// One viewport camera.
///
/// Exclusively owns everything but the batch pool and graphic store, which
/// it borrows from the `RenderContext` per call. The backend strategy is
/// chosen once at construction and never swapped.
pub struct Camera {
    /// Presentation placement (zoom-independent); effects jitter is added
    /// on top at present time, never stored here
    position: Vec2,
    viewport: Viewport,
    follow: FollowState,

    background_color: Color,
    tint: Color,
    alpha: f32,
    visible: bool,
    pixel_perfect_render: bool,
    pixel_perfect_shake: bool,

    flash: FlashEffect,
    fade: FadeEffect,
    shake: ShakeEffect,
    /// This frame's shake jitter (recomputed every update)
    shake_offset: Vec2,

    backend: Box<dyn RenderBackend>,
    stack: DrawStack,
    on_resize: Option<Box<dyn FnMut(i32, i32)>>,
}

impl Camera {
    /// Create a camera against a context.
    ///
    /// Non-positive `width`/`height` resolve to the context's default camera
    /// size; a `zoom` of zero (or below) resolves to the context's default
    /// zoom. The backend is resized to the resolved dimensions.
    pub fn new(
        ctx: &RenderContext,
        width: i32,
        height: i32,
        zoom: f32,
        mut backend: Box<dyn RenderBackend>,
    ) -> Self {
        let (default_w, default_h) = ctx.config().default_camera_size;
        let width = if width > 0 { width } else { default_w };
        let height = if height > 0 { height } else { default_h };
        let zoom = if zoom > 0.0 { zoom } else { ctx.config().default_zoom };

        backend.resize(width as u32, height as u32);
        crate::engine_debug!(
            "prism2d::Camera",
            "Camera created {}x{} at zoom {}",
            width,
            height,
            zoom
        );

        Self {
            position: Vec2::ZERO,
            viewport: Viewport::new(width, height, zoom),
            follow: FollowState::new(),
            background_color: Color::BLACK,
            tint: Color::WHITE,
            alpha: 1.0,
            visible: true,
            pixel_perfect_render: false,
            pixel_perfect_shake: false,
            flash: FlashEffect::default(),
            fade: FadeEffect::default(),
            shake: ShakeEffect::default(),
            shake_offset: Vec2::ZERO,
            backend,
            stack: DrawStack::new(),
            on_resize: None,
        }
    }

    // ===== PER-FRAME DRIVING =====

    /// Advance one frame: follow scroll, scroll clamping, effect timers.
    ///
    /// Size/scale-dependent caches are cascade-driven by their setters and
    /// need no per-frame work.
    pub fn update(&mut self, elapsed: f32) {
        self.follow.update(&self.viewport, elapsed);
        self.follow.apply_bounds(&self.viewport);

        self.flash.update(elapsed);
        self.fade.update(elapsed);
        self.shake_offset =
            self.shake
                .update(elapsed, self.viewport.size(), self.pixel_perfect_shake);
    }

    /// Play the stack back in submission order, composite effects, present,
    /// and return every batch node to the pool.
    ///
    /// Runs exactly once per frame. An invisible camera skips all drawing
    /// but still clears its stack.
    pub fn render(&mut self, ctx: &mut RenderContext) -> Result<DrawStats> {
        let result = if self.visible {
            self.backend.begin_frame(self.background_color);
            self.playback(ctx)
        } else {
            Ok(DrawStats::default())
        };
        self.stack.clear(&mut ctx.pool);
        result
    }

    fn playback(&mut self, ctx: &RenderContext) -> Result<DrawStats> {
        let params = PlaybackParams::new(
            self.viewport.rotation_transform(),
            self.viewport.view_rect_local(),
        );

        for (_, batch) in self.stack.iter(&ctx.pool) {
            match batch.geometry() {
                BatchGeometry::Quads(quads) => {
                    let Some(key) = batch.key().graphic else {
                        continue;
                    };
                    match ctx.graphics.get(key) {
                        Some(graphic) => {
                            self.backend.draw_quads(graphic, batch.key(), quads, &params)?
                        }
                        None => {
                            crate::engine_debug!(
                                "prism2d::Camera",
                                "Skipping quad batch: graphic {:?} was destroyed",
                                key
                            );
                        }
                    }
                }
                BatchGeometry::Triangles(triangles) => {
                    let graphic = match batch.key().graphic {
                        Some(key) => match ctx.graphics.get(key) {
                            Some(graphic) => Some(graphic),
                            None => {
                                crate::engine_debug!(
                                    "prism2d::Camera",
                                    "Skipping triangle batch: graphic {:?} was destroyed",
                                    key
                                );
                                continue;
                            }
                        },
                        None => None,
                    };
                    self.backend
                        .draw_triangles(graphic, batch.key(), triangles, &params)?;
                }
            }
        }

        self.draw_fx();
        let present = self.present_params();
        self.backend.present(&present)
    }

    /// Composite flash then fade over the scene, through whichever fill
    /// primitive the backend exposes.
    fn draw_fx(&mut self) {
        let view = self.viewport.view_rect_local();
        if let Some(color) = self.flash.fill_color() {
            self.backend.fill_rect(view, color);
        }
        if let Some(color) = self.fade.fill_color() {
            self.backend.fill_rect(view, color);
        }
    }

    fn present_params(&self) -> PresentParams {
        let mut position = self.position + self.shake_offset;
        if self.pixel_perfect_render {
            position = position.round();
        }
        PresentParams {
            position,
            total_scale: self.viewport.total_scale(),
            angle: self.viewport.angle(),
            alpha: self.alpha,
            tint: self.tint,
        }
    }

    /// Return any still-checked-out batch nodes to the pool.
    ///
    /// Call before dropping a camera mid-frame; a camera rendered to the
    /// end of its last frame holds no nodes.
    pub fn release(&mut self, ctx: &mut RenderContext) {
        self.stack.clear(&mut ctx.pool);
    }

    // ===== DRAW SUBMISSION =====

    /// Submit one quad: `source` texels of `graphic` placed by `matrix`
    /// (camera space; the caller has already applied scroll).
    ///
    /// Merges into the stack tail when the render state matches, else
    /// starts a new batch. No culling happens here — callers clip against
    /// the rotated camera bounds at their discretion.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_quad(
        &mut self,
        ctx: &mut RenderContext,
        graphic: GraphicKey,
        source: Rect,
        matrix: Affine2,
        color: Option<Color>,
        offset: Option<ColorOffset>,
        blend: BlendMode,
        smoothing: bool,
        shader: Option<ShaderId>,
    ) {
        let mut flags = BatchFlags::empty();
        if color.is_some() {
            flags |= BatchFlags::COLOR_MULT;
        }
        if offset.is_some() {
            flags |= BatchFlags::COLOR_OFFSET;
        }
        if smoothing {
            flags |= BatchFlags::SMOOTHING;
        }

        let key = BatchKey::new(Some(graphic), flags, blend, shader);
        let id = self.stack.acquire_quad_batch(&mut ctx.pool, key);
        ctx.pool.get_mut(id).push_quad(QuadGeom {
            source,
            matrix,
            color: color.unwrap_or(Color::WHITE),
            offset: offset.unwrap_or(ColorOffset::ZERO),
        });
    }

    /// Submit indexed triangles, translated by `position`.
    ///
    /// An axis-aligned bound is grown incrementally over the vertex set;
    /// on a backend that culls at submission (immediate composition), a
    /// submission whose bound misses the view is discarded before any
    /// buffer writes. On the batched backend the same test runs at
    /// playback against the batch's accumulated bounds.
    ///
    /// `uvs` must parallel `positions` when a graphic is given; `colors`
    /// is either empty (all white) or parallel to `positions`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_triangles(
        &mut self,
        ctx: &mut RenderContext,
        graphic: Option<GraphicKey>,
        positions: &[Vec2],
        indices: &[u16],
        uvs: &[Vec2],
        colors: &[Color],
        position: Vec2,
        blend: BlendMode,
        smoothing: bool,
        shader: Option<ShaderId>,
    ) {
        if positions.is_empty() || indices.is_empty() {
            return;
        }
        if graphic.is_some() && uvs.len() != positions.len() {
            crate::engine_warn!(
                "prism2d::Camera",
                "Triangle submission dropped: {} uvs for {} vertices",
                uvs.len(),
                positions.len()
            );
            return;
        }
        if !colors.is_empty() && colors.len() != positions.len() {
            crate::engine_warn!(
                "prism2d::Camera",
                "Triangle submission dropped: {} colors for {} vertices",
                colors.len(),
                positions.len()
            );
            return;
        }
        if indices.iter().any(|&i| i as usize >= positions.len()) {
            crate::engine_warn!(
                "prism2d::Camera",
                "Triangle submission dropped: index out of range for {} vertices",
                positions.len()
            );
            return;
        }

        // Translate and bound the vertex set before touching any batch.
        let mut bounds = Rect::new(
            positions[0].x + position.x,
            positions[0].y + position.y,
            0.0,
            0.0,
        );
        for p in &positions[1..] {
            bounds.expand_to_point(*p + position);
        }
        if self.backend.culls_on_submit() && !bounds.overlaps(&self.viewport.view_rect_local()) {
            return;
        }

        let mut flags = BatchFlags::empty();
        if !colors.is_empty() {
            flags |= BatchFlags::COLOR_MULT;
        }
        if smoothing {
            flags |= BatchFlags::SMOOTHING;
        }

        let key = BatchKey::new(graphic, flags, blend, shader);
        let id = self.stack.acquire_triangle_batch(&mut ctx.pool, key);
        let triangles = ctx.pool.get_mut(id).triangles_mut();

        let base = triangles.vertex_count() as u16;
        for p in positions {
            let translated = *p + position;
            triangles.positions.push(translated);
            triangles.expand_bounds(translated);
        }
        triangles.uvs.extend_from_slice(uvs);
        triangles.colors.extend_from_slice(colors);
        triangles.indices.extend(indices.iter().map(|i| i + base));
    }

    // ===== TRANSFORM =====

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn width(&self) -> i32 {
        self.viewport.width()
    }

    pub fn height(&self) -> i32 {
        self.viewport.height()
    }

    pub fn zoom(&self) -> f32 {
        self.viewport.zoom()
    }

    pub fn angle(&self) -> f32 {
        self.viewport.angle()
    }

    /// Transform state (margins, view rects, scales).
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Resize the camera. Non-positive dimensions are ignored.
    pub fn set_size(&mut self, width: i32, height: i32) {
        if self.viewport.set_size(width, height) {
            self.after_resize();
        }
    }

    /// Set camera zoom. Non-positive zoom is ignored.
    pub fn set_zoom(&mut self, zoom: f32) {
        if self.viewport.set_zoom(zoom) {
            self.after_resize();
        }
    }

    /// Set per-axis camera scale. Non-positive components are ignored.
    pub fn set_scale(&mut self, x: f32, y: f32) {
        if self.viewport.set_scale(x, y) {
            self.after_resize();
        }
    }

    /// Host display scale (two independent axis multipliers).
    pub fn set_display_scale(&mut self, scale: Vec2) {
        if self.viewport.set_display_scale(scale) {
            self.after_resize();
        }
    }

    /// Derived-state cascade shared by size/scale/zoom setters: margins and
    /// the presentation anchor were recomputed by the viewport; resize the
    /// backend storage and notify the observer.
    fn after_resize(&mut self) {
        self.backend
            .resize(self.viewport.width() as u32, self.viewport.height() as u32);
        if let Some(hook) = self.on_resize.as_mut() {
            hook(self.viewport.width(), self.viewport.height());
        }
    }

    /// Observer notified at the end of every size/scale cascade.
    pub fn set_resize_hook(&mut self, hook: Option<Box<dyn FnMut(i32, i32)>>) {
        self.on_resize = hook;
    }

    pub fn set_angle(&mut self, degrees: f32) {
        self.viewport.set_angle(degrees);
    }

    // ===== APPEARANCE =====

    pub fn background_color(&self) -> Color {
        self.background_color
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Whole-camera transparency, clamped into [0,1].
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn tint(&self) -> Color {
        self.tint
    }

    pub fn set_tint(&mut self, tint: Color) {
        self.tint = tint;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_pixel_perfect_render(&mut self, enabled: bool) {
        self.pixel_perfect_render = enabled;
    }

    pub fn set_pixel_perfect_shake(&mut self, enabled: bool) {
        self.pixel_perfect_shake = enabled;
    }

    /// Backend strategy, for hosts that need the frame output.
    pub fn backend(&self) -> &dyn RenderBackend {
        self.backend.as_ref()
    }

    // ===== SCROLL / FOLLOW =====

    /// World-space top-left of the view.
    pub fn scroll(&self) -> Vec2 {
        self.follow.scroll()
    }

    /// Place scroll directly (also resets the smoothing target).
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.follow.set_scroll(scroll);
        self.follow.apply_bounds(&self.viewport);
    }

    /// Center the view on a world point.
    pub fn focus_on(&mut self, point: Vec2) {
        self.follow.focus_on(&self.viewport, point);
        self.follow.apply_bounds(&self.viewport);
    }

    /// Track `target` with `style`. The deadzone is derived here, from the
    /// camera and target sizes at this instant, and is not re-derived when
    /// either changes later.
    pub fn follow(&mut self, target: Rc<dyn FollowTarget>, style: FollowStyle, lerp: f32) {
        self.follow.follow(&self.viewport, target, style, lerp);
    }

    /// Stop tracking.
    pub fn unfollow(&mut self) {
        self.follow.unfollow();
    }

    /// Jump scroll straight to its target, bypassing smoothing.
    pub fn snap_to_target(&mut self) {
        self.follow.snap_to_target(&self.viewport, 0.0);
    }

    /// Offset added to the target position before deadzone math.
    pub fn set_target_offset(&mut self, offset: Vec2) {
        self.follow.set_target_offset(offset);
    }

    /// Anticipatory scroll factor per axis (0 disables lead).
    pub fn set_lead(&mut self, lead: Vec2) {
        self.follow.set_lead(lead);
    }

    /// Scroll bounds; `None` leaves a side unbounded.
    pub fn set_scroll_bounds(
        &mut self,
        min_x: Option<f32>,
        max_x: Option<f32>,
        min_y: Option<f32>,
        max_y: Option<f32>,
    ) {
        self.follow.set_scroll_bounds(min_x, max_x, min_y, max_y);
        self.follow.apply_bounds(&self.viewport);
    }

    /// Deadzone snapshot, camera-local.
    pub fn deadzone(&self) -> Option<Rect> {
        self.follow.deadzone()
    }

    /// Visible world area for the current scroll.
    pub fn view_rect(&self) -> Rect {
        self.viewport.view_rect(self.follow.scroll())
    }

    /// Whether a world point falls inside the (possibly rotated) view.
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.viewport
            .rotated_view_bounds(self.follow.scroll())
            .contains_point(point)
    }

    /// Whether a world rect touches the (possibly rotated) view.
    pub fn intersects_view(&self, rect: &Rect) -> bool {
        self.viewport
            .rotated_view_bounds(self.follow.scroll())
            .overlaps(rect)
    }

    // ===== EFFECTS =====

    /// Full-screen color burst. Ignored while active unless `force`.
    pub fn flash(
        &mut self,
        color: Color,
        duration: f32,
        on_complete: Option<Box<dyn FnOnce()>>,
        force: bool,
    ) {
        self.flash.start(color, duration, on_complete, force);
    }

    /// Fade toward cover (`fade_in = false`) or from cover to reveal
    /// (`fade_in = true`). Ignored while running unless `force`.
    pub fn fade(
        &mut self,
        color: Color,
        duration: f32,
        fade_in: bool,
        on_complete: Option<Box<dyn FnOnce()>>,
        force: bool,
    ) {
        self.fade.start(color, duration, fade_in, on_complete, force);
    }

    /// Jitter the presentation position on the enabled axes. Conventionally
    /// forced; pass `force = false` to preserve a running shake.
    pub fn shake(
        &mut self,
        intensity: f32,
        duration: f32,
        on_complete: Option<Box<dyn FnOnce()>>,
        force: bool,
        axes: ShakeAxes,
    ) {
        self.shake.start(intensity, duration, on_complete, force, axes);
    }

    /// Stop the flash without firing its handler.
    pub fn stop_flash(&mut self) {
        self.flash.stop();
    }

    /// Stop the fade without firing its handler.
    pub fn stop_fade(&mut self) {
        self.fade.stop();
    }

    /// Stop the shake without firing its handler.
    pub fn stop_shake(&mut self) {
        self.shake.stop();
    }

    /// Stop all three effects without firing any handler.
    pub fn stop_fx(&mut self) {
        self.stop_flash();
        self.stop_fade();
        self.stop_shake();
    }

    /// This frame's shake jitter (zero when no shake is active).
    pub fn shake_offset(&self) -> Vec2 {
        self.shake_offset
    }

    /// Where the frame is presented: position plus jitter, rounded when
    /// pixel-perfect rendering is on.
    pub fn presentation_position(&self) -> Vec2 {
        self.present_params().position
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
