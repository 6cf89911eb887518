//! RenderBackend trait - the strategy seam between batch playback and output
//!
//! A camera owns exactly one backend, chosen at construction:
//! `ImmediateCompositionBackend` composites pixels into an owned buffer;
//! `BatchedDrawBackend` retains keyed draw calls for host submission.
//! Playback drives both through the same primitives so the two strategies
//! stay visually consistent.

use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};
use crate::color::Color;
use crate::error::Result;
use crate::geom::Rect;
use crate::renderer::batch::{BatchKey, QuadGeom, TriangleGeometry};
use crate::resource::Graphic;

// ============================================================================
// Common types
// ============================================================================

/// One vertex of a batched draw call.
///
/// Layout is GPU-ready: position/uv in camera/texture space, multiplicative
/// color and additive color offset as vec4 attributes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [f32; 4],
    pub offset: [f32; 4],
}

/// A retained draw call produced by the batched backend: the merge key that
/// selected the pipeline state, plus indexed vertices.
#[derive(Debug, Clone)]
pub struct DrawCall {
    pub key: BatchKey,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
}

/// Per-frame render statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    /// Number of draw calls this frame
    pub draw_calls: u32,
    /// Number of quads drawn this frame
    pub quads: u32,
    /// Number of triangles drawn this frame
    pub triangles: u32,
}

/// Camera state a playback pass hands to every backend primitive.
#[derive(Debug, Clone, Copy)]
pub struct PlaybackParams {
    /// Camera rotation helper (identity when the camera is unrotated).
    /// Applied on top of each submission's own matrix by both backends.
    pub transform: Affine2,
    /// Camera-local view rectangle (margin-inset), for playback culling
    pub view_rect: Rect,
}

impl PlaybackParams {
    pub fn new(transform: Affine2, view_rect: Rect) -> Self {
        Self { transform, view_rect }
    }
}

/// Presentation state for the end of a frame.
#[derive(Debug, Clone, Copy)]
pub struct PresentParams {
    /// Presentation position (camera position plus shake offset, rounded
    /// when pixel-perfect rendering is on)
    pub position: Vec2,
    /// Camera scale × host display scale
    pub total_scale: Vec2,
    /// Rotation in degrees
    pub angle: f32,
    /// Whole-camera transparency, [0,1]
    pub alpha: f32,
    /// Whole-camera tint multiplier
    pub tint: Color,
}

/// Borrowed view of a finished frame.
pub enum FrameView<'a> {
    /// Composited pixels, row-major `0xRRGGBBAA`
    Pixels {
        width: u32,
        height: u32,
        pixels: &'a [u32],
    },
    /// Retained draw calls in submission order
    DrawCalls(&'a [DrawCall]),
}

// ============================================================================
// RenderBackend trait
// ============================================================================

/// Strategy for turning batch playback into output.
///
/// `&mut self` throughout — a backend is exclusively owned by its camera and
/// mutated only during that camera's frame.
pub trait RenderBackend: Send + Sync {
    /// Resize backing storage to the camera's size (camera units).
    fn resize(&mut self, width: u32, height: u32);

    /// Start a frame: drop retained output, reset stats, fill with the
    /// background color.
    fn begin_frame(&mut self, background: Color);

    /// Whether triangle submissions are culled at submission time.
    ///
    /// The immediate compositor rejects a whole submission before any buffer
    /// writes when its bounds miss the view; the batched backend defers the
    /// same test to playback.
    fn culls_on_submit(&self) -> bool;

    /// Draw one quad batch.
    fn draw_quads(
        &mut self,
        graphic: &Graphic,
        key: &BatchKey,
        quads: &[QuadGeom],
        params: &PlaybackParams,
    ) -> Result<()>;

    /// Draw one triangle batch. `graphic` is `None` for untextured geometry.
    fn draw_triangles(
        &mut self,
        graphic: Option<&Graphic>,
        key: &BatchKey,
        geometry: &TriangleGeometry,
        params: &PlaybackParams,
    ) -> Result<()>;

    /// Fill a camera-local rectangle (background and effect compositing).
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Finish the frame. Returns this frame's statistics.
    fn present(&mut self, params: &PresentParams) -> Result<DrawStats>;

    /// Borrow this frame's output.
    fn frame(&self) -> FrameView<'_>;
}
