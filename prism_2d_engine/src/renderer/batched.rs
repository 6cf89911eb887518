//! Batched-draw backend — retained draw-call submission.
//!
//! Converts playback into a list of keyed, indexed draw calls the host
//! submits to its GPU layer. Nothing is rasterized here; triangle culling
//! is deferred to playback using each batch's accumulated bounds.

use glam::Vec2;
use crate::color::Color;
use crate::error::Result;
use crate::geom::Rect;
use crate::renderer::backend::{
    DrawCall, DrawStats, FrameView, PlaybackParams, PresentParams, RenderBackend, Vertex,
};
use crate::renderer::batch::{BatchFlags, BatchKey, BlendMode, QuadGeom, TriangleGeometry};
use crate::resource::Graphic;

/// Quad corner expansion order: two triangles per quad.
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 1, 3];

/// Draw-call-recording backend.
pub struct BatchedDrawBackend {
    width: u32,
    height: u32,
    calls: Vec<DrawCall>,
    stats: DrawStats,
}

impl BatchedDrawBackend {
    /// Create a backend for a `width`x`height` camera (camera units).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            calls: Vec::new(),
            stats: DrawStats::default(),
        }
    }

    /// Draw calls recorded this frame, in submission order.
    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.calls
    }

    fn vertex(position: Vec2, uv: Vec2, color: Color, offset: [f32; 4]) -> Vertex {
        Vertex {
            position: position.to_array(),
            uv: uv.to_array(),
            color: color.to_array(),
            offset,
        }
    }
}

impl RenderBackend for BatchedDrawBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn begin_frame(&mut self, background: Color) {
        self.calls.clear();
        self.stats = DrawStats::default();
        if background.a > 0.0 {
            self.fill_rect(
                Rect::new(0.0, 0.0, self.width as f32, self.height as f32),
                background,
            );
        }
    }

    fn culls_on_submit(&self) -> bool {
        false
    }

    fn draw_quads(
        &mut self,
        graphic: &Graphic,
        key: &BatchKey,
        quads: &[QuadGeom],
        params: &PlaybackParams,
    ) -> Result<()> {
        if quads.is_empty() {
            return Ok(());
        }
        let texel = Vec2::new(1.0 / graphic.width() as f32, 1.0 / graphic.height() as f32);

        let mut vertices = Vec::with_capacity(quads.len() * 4);
        let mut indices = Vec::with_capacity(quads.len() * 6);
        for quad in quads {
            let base = vertices.len() as u16;
            let matrix = params.transform * quad.matrix;
            let frame = quad.source;
            let offset = quad.offset.to_array();

            let corners = [
                (Vec2::ZERO, Vec2::new(frame.x, frame.y)),
                (Vec2::new(frame.width, 0.0), Vec2::new(frame.right(), frame.y)),
                (Vec2::new(0.0, frame.height), Vec2::new(frame.x, frame.bottom())),
                (Vec2::new(frame.width, frame.height), Vec2::new(frame.right(), frame.bottom())),
            ];
            for (local, tex) in corners {
                vertices.push(Self::vertex(
                    matrix.transform_point2(local),
                    tex * texel,
                    quad.color,
                    offset,
                ));
            }
            indices.extend(QUAD_INDICES.iter().map(|i| base + i));
        }

        self.calls.push(DrawCall { key: *key, vertices, indices });
        self.stats.draw_calls += 1;
        self.stats.quads += quads.len() as u32;
        Ok(())
    }

    fn draw_triangles(
        &mut self,
        _graphic: Option<&Graphic>,
        key: &BatchKey,
        geometry: &TriangleGeometry,
        params: &PlaybackParams,
    ) -> Result<()> {
        if geometry.indices.is_empty() {
            return Ok(());
        }
        // Deferred culling: the whole batch is skipped when its accumulated
        // bounds never touch the view.
        if let Some(bounds) = geometry.bounds {
            if !bounds.overlaps(&params.view_rect) {
                return Ok(());
            }
        }

        let vertices = geometry
            .positions
            .iter()
            .enumerate()
            .map(|(i, &position)| {
                let uv = geometry.uvs.get(i).copied().unwrap_or(Vec2::ZERO);
                let color = geometry.colors.get(i).copied().unwrap_or(Color::WHITE);
                Self::vertex(
                    params.transform.transform_point2(position),
                    uv,
                    color,
                    [0.0; 4],
                )
            })
            .collect();

        self.calls.push(DrawCall {
            key: *key,
            vertices,
            indices: geometry.indices.clone(),
        });
        self.stats.draw_calls += 1;
        self.stats.triangles += geometry.triangle_count() as u32;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let key = BatchKey::new(None, BatchFlags::COLOR_MULT, BlendMode::Normal, None);
        let corners = [
            Vec2::new(rect.x, rect.y),
            Vec2::new(rect.right(), rect.y),
            Vec2::new(rect.x, rect.bottom()),
            Vec2::new(rect.right(), rect.bottom()),
        ];
        let vertices = corners
            .into_iter()
            .map(|corner| Self::vertex(corner, Vec2::ZERO, color, [0.0; 4]))
            .collect();
        self.calls.push(DrawCall {
            key,
            vertices,
            indices: QUAD_INDICES.to_vec(),
        });
        self.stats.draw_calls += 1;
    }

    fn present(&mut self, _params: &PresentParams) -> Result<DrawStats> {
        Ok(self.stats)
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView::DrawCalls(&self.calls)
    }
}

#[cfg(test)]
#[path = "batched_tests.rs"]
mod tests;
