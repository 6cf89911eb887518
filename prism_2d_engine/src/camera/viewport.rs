//! Viewport — the camera's transform state.
//!
//! Owns size, zoom/scale, display scale, rotation and the caches derived
//! from them (view margins, rotation sine/cosine, presentation anchor).
//! All scale math distinguishes *camera scale* (the camera's own
//! magnification, per axis) from *total scale* (camera scale × host display
//! scale, used for presentation sizing).

use glam::{Affine2, Mat2, Vec2};
use crate::geom::Rect;

/// Transform state of one camera.
///
/// Setters that would produce a non-positive size or scale are silent
/// no-ops; derived caches are recomputed only when a value actually
/// changes. Rotation sine/cosine are cached per angle change, not per use.
#[derive(Debug, Clone)]
pub struct Viewport {
    width: i32,
    height: i32,
    /// Zoom at construction; margin math is relative to this
    initial_zoom: f32,
    /// Camera-local scale, per axis (zoom sets both axes)
    scale: Vec2,
    /// Host display scale, per axis
    display_scale: Vec2,
    /// Rotation in degrees
    angle: f32,
    angle_sin: f32,
    angle_cos: f32,
    /// Derived: symmetric inset of the visible area, per axis
    view_margin: Vec2,
    /// Derived: anchor about which the presented frame is centered
    presentation_offset: Vec2,
}

impl Viewport {
    /// Create a viewport. `width`/`height` must be positive; `zoom` must be
    /// positive (zoom-default resolution happens in `Camera::new`).
    pub fn new(width: i32, height: i32, zoom: f32) -> Self {
        let mut viewport = Self {
            width,
            height,
            initial_zoom: zoom,
            scale: Vec2::splat(zoom),
            display_scale: Vec2::ONE,
            angle: 0.0,
            angle_sin: 0.0,
            angle_cos: 1.0,
            view_margin: Vec2::ZERO,
            presentation_offset: Vec2::ZERO,
        };
        viewport.update_derived();
        viewport
    }

    // ===== SIZE =====

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Resize the camera. Non-positive dimensions are ignored.
    /// Returns true when the size actually changed.
    pub fn set_size(&mut self, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 {
            return false;
        }
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.update_derived();
        true
    }

    // ===== SCALE / ZOOM =====

    /// Camera-local scale, per axis.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Camera zoom (the X axis of the camera-local scale).
    pub fn zoom(&self) -> f32 {
        self.scale.x
    }

    /// Zoom the camera was created with.
    pub fn initial_zoom(&self) -> f32 {
        self.initial_zoom
    }

    /// Camera scale × host display scale.
    pub fn total_scale(&self) -> Vec2 {
        self.scale * self.display_scale
    }

    /// Set per-axis camera scale. Non-positive components are ignored.
    /// Returns true when the scale actually changed.
    pub fn set_scale(&mut self, x: f32, y: f32) -> bool {
        if x <= 0.0 || y <= 0.0 {
            return false;
        }
        let scale = Vec2::new(x, y);
        if scale == self.scale {
            return false;
        }
        self.scale = scale;
        self.update_derived();
        true
    }

    /// Set zoom (both scale axes). Non-positive zoom is ignored.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        self.set_scale(zoom, zoom)
    }

    /// Host display scale, per axis.
    pub fn display_scale(&self) -> Vec2 {
        self.display_scale
    }

    /// Set the host display scale. Non-positive components are ignored.
    pub fn set_display_scale(&mut self, scale: Vec2) -> bool {
        if scale.x <= 0.0 || scale.y <= 0.0 || scale == self.display_scale {
            return false;
        }
        self.display_scale = scale;
        self.update_derived();
        true
    }

    // ===== ROTATION =====

    /// Rotation in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Set rotation. Sine/cosine are recomputed only when the angle changes.
    pub fn set_angle(&mut self, degrees: f32) -> bool {
        if degrees == self.angle {
            return false;
        }
        self.angle = degrees;
        let radians = degrees.to_radians();
        self.angle_sin = radians.sin();
        self.angle_cos = radians.cos();
        true
    }

    /// Whether the rotation helper is a no-op.
    pub fn is_unrotated(&self) -> bool {
        self.angle % 360.0 == 0.0
    }

    /// The camera's rotation transform: translate to the camera center,
    /// rotate by the cached sine/cosine, translate back. Identity when the
    /// angle is a multiple of 360.
    ///
    /// Both backends apply this same transform during playback, so pixel
    /// composition and batched geometry agree under rotation.
    pub fn rotation_transform(&self) -> Affine2 {
        if self.is_unrotated() {
            return Affine2::IDENTITY;
        }
        let center = self.size() * 0.5;
        let rotation = Affine2::from_mat2(Mat2::from_cols(
            Vec2::new(self.angle_cos, self.angle_sin),
            Vec2::new(-self.angle_sin, self.angle_cos),
        ));
        Affine2::from_translation(center) * rotation * Affine2::from_translation(-center)
    }

    /// Apply the rotation helper to a placement matrix.
    pub fn rotate_matrix(&self, matrix: Affine2) -> Affine2 {
        if self.is_unrotated() {
            matrix
        } else {
            self.rotation_transform() * matrix
        }
    }

    // ===== VIEW MARGINS / RECTANGLES =====

    /// Symmetric per-axis inset of the visible area.
    ///
    /// Positive when zoomed in past the initial zoom, negative when zoomed
    /// out (the view then extends beyond the camera rectangle).
    pub fn view_margin(&self) -> Vec2 {
        self.view_margin
    }

    /// Distance from the camera's left edge to the view's left edge.
    pub fn margin_left(&self) -> f32 {
        self.view_margin.x
    }

    /// Distance from the camera's left edge to the view's right edge.
    pub fn margin_right(&self) -> f32 {
        self.view_margin.x + self.view_width()
    }

    /// Distance from the camera's top edge to the view's top edge.
    pub fn margin_top(&self) -> f32 {
        self.view_margin.y
    }

    /// Distance from the camera's top edge to the view's bottom edge.
    pub fn margin_bottom(&self) -> f32 {
        self.view_margin.y + self.view_height()
    }

    /// Width of the visible area, in camera units.
    pub fn view_width(&self) -> f32 {
        self.width as f32 - 2.0 * self.view_margin.x
    }

    /// Height of the visible area, in camera units.
    pub fn view_height(&self) -> f32 {
        self.height as f32 - 2.0 * self.view_margin.y
    }

    /// Visible area in world space for a given scroll.
    pub fn view_rect(&self, scroll: Vec2) -> Rect {
        Rect::new(
            scroll.x + self.view_margin.x,
            scroll.y + self.view_margin.y,
            self.view_width(),
            self.view_height(),
        )
    }

    /// Visible area in camera-local space (scroll-independent).
    pub fn view_rect_local(&self) -> Rect {
        Rect::new(
            self.view_margin.x,
            self.view_margin.y,
            self.view_width(),
            self.view_height(),
        )
    }

    /// World-space bounding rectangle of the (possibly rotated) view.
    pub fn rotated_view_bounds(&self, scroll: Vec2) -> Rect {
        let view = self.view_rect(scroll);
        if self.is_unrotated() {
            return view;
        }
        let origin = Vec2::new(view.width * 0.5, view.height * 0.5);
        view.rotated_bounds(self.angle, origin)
    }

    // ===== PRESENTATION =====

    /// Anchor about which the presented frame is centered.
    pub fn presentation_offset(&self) -> Vec2 {
        self.presentation_offset
    }

    /// Recompute every cache derived from size and scale: view margins,
    /// then the presentation anchor. Rotation trig is angle-driven and
    /// cached separately.
    fn update_derived(&mut self) {
        let size = self.size();
        self.view_margin = Vec2::new(
            0.5 * size.x * (self.scale.x - self.initial_zoom) / self.scale.x,
            0.5 * size.y * (self.scale.y - self.initial_zoom) / self.scale.y,
        );
        self.presentation_offset = size * 0.5 * self.display_scale * self.initial_zoom;
    }
}

#[cfg(test)]
#[path = "viewport_tests.rs"]
mod tests;
