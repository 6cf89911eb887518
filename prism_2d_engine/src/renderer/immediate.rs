//! Immediate-composition backend — CPU pixel compositing.
//!
//! Owns an RGBA8 buffer sized to the camera and rasterizes playback directly
//! into it: quads by inverse-affine sampling of their source frames,
//! triangles by barycentric fill, effects and backgrounds by rect fills.
//! Output is the finished pixel buffer (`FrameView::Pixels`).

use glam::Vec2;
use crate::color::Color;
use crate::error::Result;
use crate::geom::Rect;
use crate::renderer::backend::{
    DrawStats, FrameView, PlaybackParams, PresentParams, RenderBackend,
};
use crate::renderer::batch::{BatchFlags, BatchKey, BlendMode, QuadGeom, TriangleGeometry};
use crate::resource::Graphic;

/// Pixel-compositing backend with an owned buffer.
pub struct ImmediateCompositionBackend {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
    stats: DrawStats,
}

impl ImmediateCompositionBackend {
    /// Create a backend with a `width`x`height` buffer (camera units).
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height) as usize],
            stats: DrawStats::default(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed pixel at (x, y). Out-of-range reads as transparent.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[(y * self.width + x) as usize]
    }

    /// Source-over compositing of `src` onto the packed `dst`, with the
    /// batch blend mode applied to the source color first.
    fn composite(dst: u32, src: Color, blend: BlendMode) -> u32 {
        if src.a <= 0.0 {
            return dst;
        }
        let d = Color::from_bits(dst);
        let s = match blend {
            BlendMode::Normal => src,
            BlendMode::Add => Color::new(d.r + src.r, d.g + src.g, d.b + src.b, src.a),
            BlendMode::Multiply => Color::new(d.r * src.r, d.g * src.g, d.b * src.b, src.a),
            BlendMode::Screen => Color::new(
                1.0 - (1.0 - d.r) * (1.0 - src.r),
                1.0 - (1.0 - d.g) * (1.0 - src.g),
                1.0 - (1.0 - d.b) * (1.0 - src.b),
                src.a,
            ),
        };
        let a = s.a.clamp(0.0, 1.0);
        let out = Color::new(
            s.r * a + d.r * (1.0 - a),
            s.g * a + d.g * (1.0 - a),
            s.b * a + d.b * (1.0 - a),
            a + d.a * (1.0 - a),
        );
        out.to_bits()
    }

    /// Sample a graphic inside `frame` at frame-local coordinates.
    fn sample(graphic: &Graphic, frame: &Rect, local: Vec2, smoothing: bool) -> Color {
        if smoothing {
            // Bilinear over the four texels around the sample point,
            // clamped to the frame so neighbors never bleed in.
            let sx = frame.x + local.x - 0.5;
            let sy = frame.y + local.y - 0.5;
            let x0 = sx.floor();
            let y0 = sy.floor();
            let fx = sx - x0;
            let fy = sy - y0;

            let clamp_x = |v: f32| v.clamp(frame.x, frame.right() - 1.0) as i32;
            let clamp_y = |v: f32| v.clamp(frame.y, frame.bottom() - 1.0) as i32;

            let c00 = Color::from_bits(graphic.texel(clamp_x(x0), clamp_y(y0)));
            let c10 = Color::from_bits(graphic.texel(clamp_x(x0 + 1.0), clamp_y(y0)));
            let c01 = Color::from_bits(graphic.texel(clamp_x(x0), clamp_y(y0 + 1.0)));
            let c11 = Color::from_bits(graphic.texel(clamp_x(x0 + 1.0), clamp_y(y0 + 1.0)));

            let lerp = |a: f32, b: f32, t: f32| a + (b - a) * t;
            let mix = |a: Color, b: Color, t: f32| {
                Color::new(
                    lerp(a.r, b.r, t),
                    lerp(a.g, b.g, t),
                    lerp(a.b, b.b, t),
                    lerp(a.a, b.a, t),
                )
            };
            mix(mix(c00, c10, fx), mix(c01, c11, fx), fy)
        } else {
            let tx = (frame.x + local.x).floor() as i32;
            let ty = (frame.y + local.y).floor() as i32;
            Color::from_bits(graphic.texel(tx, ty))
        }
    }

    /// Destination-space scan bounds for a set of points, clipped to the
    /// buffer. Returns `None` when fully outside.
    fn scan_bounds(&self, points: &[Vec2]) -> Option<(u32, u32, u32, u32)> {
        let mut bounds = Rect::new(points[0].x, points[0].y, 0.0, 0.0);
        for &p in &points[1..] {
            bounds.expand_to_point(p);
        }
        let x0 = bounds.x.floor().max(0.0) as u32;
        let y0 = bounds.y.floor().max(0.0) as u32;
        let x1 = (bounds.right().ceil().min(self.width as f32)) as u32;
        let y1 = (bounds.bottom().ceil().min(self.height as f32)) as u32;
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0, y0, x1, y1))
    }

    fn write(&mut self, x: u32, y: u32, src: Color, blend: BlendMode) {
        let idx = (y * self.width + x) as usize;
        self.pixels[idx] = Self::composite(self.pixels[idx], src, blend);
    }
}

impl RenderBackend for ImmediateCompositionBackend {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width * height) as usize];
    }

    fn begin_frame(&mut self, background: Color) {
        self.stats = DrawStats::default();
        let bits = background.to_bits();
        self.pixels.fill(bits);
    }

    fn culls_on_submit(&self) -> bool {
        true
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
        let smoothing = key.flags.contains(BatchFlags::SMOOTHING);
        let color_mult = key.flags.contains(BatchFlags::COLOR_MULT);
        let color_offset = key.flags.contains(BatchFlags::COLOR_OFFSET);

        for quad in quads {
            let matrix = params.transform * quad.matrix;
            // Degenerate placements draw nothing.
            if matrix.matrix2.determinant().abs() <= f32::EPSILON {
                continue;
            }

            let fw = quad.source.width;
            let fh = quad.source.height;
            let corners = [
                matrix.transform_point2(Vec2::ZERO),
                matrix.transform_point2(Vec2::new(fw, 0.0)),
                matrix.transform_point2(Vec2::new(0.0, fh)),
                matrix.transform_point2(Vec2::new(fw, fh)),
            ];
            let Some((x0, y0, x1, y1)) = self.scan_bounds(&corners) else {
                continue;
            };

            let inverse = matrix.inverse();
            for y in y0..y1 {
                for x in x0..x1 {
                    let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let local = inverse.transform_point2(center);
                    if local.x < 0.0 || local.x >= fw || local.y < 0.0 || local.y >= fh {
                        continue;
                    }
                    let mut color = Self::sample(graphic, &quad.source, local, smoothing);
                    if color_mult {
                        color = color.multiply(&quad.color);
                    }
                    if color_offset {
                        color = quad.offset.apply(&color).clamped();
                    }
                    self.write(x, y, color, key.blend);
                }
            }
        }

        self.stats.draw_calls += 1;
        self.stats.quads += quads.len() as u32;
        Ok(())
    }

    fn draw_triangles(
        &mut self,
        graphic: Option<&Graphic>,
        key: &BatchKey,
        geometry: &TriangleGeometry,
        params: &PlaybackParams,
    ) -> Result<()> {
        if geometry.indices.is_empty() {
            return Ok(());
        }
        let smoothing = key.flags.contains(BatchFlags::SMOOTHING);

        for tri in geometry.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = params.transform.transform_point2(geometry.positions[i0]);
            let p1 = params.transform.transform_point2(geometry.positions[i1]);
            let p2 = params.transform.transform_point2(geometry.positions[i2]);

            let area = (p1 - p0).perp_dot(p2 - p0);
            if area.abs() <= f32::EPSILON {
                continue;
            }
            let Some((x0, y0, x1, y1)) = self.scan_bounds(&[p0, p1, p2]) else {
                continue;
            };

            let vertex_color = |i: usize| geometry.colors.get(i).copied().unwrap_or(Color::WHITE);
            let (c0, c1, c2) = (vertex_color(i0), vertex_color(i1), vertex_color(i2));

            for y in y0..y1 {
                for x in x0..x1 {
                    let c = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                    let w0 = (p2 - p1).perp_dot(c - p1) / area;
                    let w1 = (p0 - p2).perp_dot(c - p2) / area;
                    let w2 = 1.0 - w0 - w1;
                    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                        continue;
                    }

                    let mut color = Color::new(
                        c0.r * w0 + c1.r * w1 + c2.r * w2,
                        c0.g * w0 + c1.g * w1 + c2.g * w2,
                        c0.b * w0 + c1.b * w1 + c2.b * w2,
                        c0.a * w0 + c1.a * w1 + c2.a * w2,
                    );
                    if let Some(graphic) = graphic {
                        let uv = geometry.uvs[i0] * w0 + geometry.uvs[i1] * w1 + geometry.uvs[i2] * w2;
                        let frame = Rect::new(0.0, 0.0, graphic.width() as f32, graphic.height() as f32);
                        let local = Vec2::new(uv.x * frame.width, uv.y * frame.height);
                        color = Self::sample(graphic, &frame, local, smoothing).multiply(&color);
                    }
                    self.write(x, y, color, key.blend);
                }
            }
        }

        self.stats.draw_calls += 1;
        self.stats.triangles += geometry.triangle_count() as u32;
        Ok(())
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.x.floor().max(0.0) as u32;
        let y0 = rect.y.floor().max(0.0) as u32;
        let x1 = (rect.right().ceil().min(self.width as f32)).max(0.0) as u32;
        let y1 = (rect.bottom().ceil().min(self.height as f32)).max(0.0) as u32;
        for y in y0..y1 {
            for x in x0..x1 {
                self.write(x, y, color, BlendMode::Normal);
            }
        }
        self.stats.draw_calls += 1;
    }

    fn present(&mut self, params: &PresentParams) -> Result<DrawStats> {
        if self.pixels.is_empty() {
            crate::engine_bail!("prism2d::ImmediateBackend", "present on a zero-sized buffer");
        }
        // Whole-camera tint/alpha are folded into the buffer so the host can
        // blit it as-is.
        if !params.tint.is_identity_multiplier() || params.alpha < 1.0 {
            let tint = params.tint;
            let alpha = params.alpha.clamp(0.0, 1.0);
            for px in &mut self.pixels {
                let c = Color::from_bits(*px).multiply(&tint);
                *px = c.with_alpha(c.a * alpha).to_bits();
            }
        }
        Ok(self.stats)
    }

    fn frame(&self) -> FrameView<'_> {
        FrameView::Pixels {
            width: self.width,
            height: self.height,
            pixels: &self.pixels,
        }
    }
}

#[cfg(test)]
#[path = "immediate_tests.rs"]
mod tests;
