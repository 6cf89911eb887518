//! Unit tests for immediate.rs
//!
//! Rasterization checks against tiny buffers: background fill, quad blits,
//! blend modes, triangle fill, clipping, and present-time tint/alpha.

use glam::{Affine2, Vec2};
use crate::color::{Color, ColorOffset};
use crate::geom::Rect;
use super::*;

fn params() -> PlaybackParams {
    PlaybackParams::new(Affine2::IDENTITY, Rect::new(0.0, 0.0, 8.0, 8.0))
}

fn present_identity() -> PresentParams {
    PresentParams {
        position: Vec2::ZERO,
        total_scale: Vec2::ONE,
        angle: 0.0,
        alpha: 1.0,
        tint: Color::WHITE,
    }
}

fn solid_graphic(color: Color) -> Graphic {
    Graphic::solid("test", 4, 4, color).unwrap()
}

fn plain_key() -> BatchKey {
    BatchKey::new(None, BatchFlags::empty(), BlendMode::Normal, None)
}

fn one_quad(x: f32, y: f32) -> QuadGeom {
    QuadGeom {
        source: Rect::new(0.0, 0.0, 4.0, 4.0),
        matrix: Affine2::from_translation(Vec2::new(x, y)),
        color: Color::WHITE,
        offset: ColorOffset::ZERO,
    }
}

// ============================================================================
// Frame setup
// ============================================================================

#[test]
fn test_begin_frame_fills_background() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLUE);
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(backend.pixel(x, y), Color::BLUE.to_bits());
        }
    }
}

#[test]
fn test_resize_reallocates() {
    let mut backend = ImmediateCompositionBackend::new(2, 2);
    backend.resize(8, 4);
    assert_eq!(backend.width(), 8);
    assert_eq!(backend.height(), 4);
    match backend.frame() {
        FrameView::Pixels { width, height, pixels } => {
            assert_eq!((width, height), (8, 4));
            assert_eq!(pixels.len(), 32);
        }
        _ => panic!("immediate backend must expose pixels"),
    }
}

// ============================================================================
// fill_rect
// ============================================================================

#[test]
fn test_fill_rect_opaque_overwrites_region() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLACK);
    backend.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), Color::RED);

    assert_eq!(backend.pixel(0, 0), Color::BLACK.to_bits());
    assert_eq!(backend.pixel(1, 1), Color::RED.to_bits());
    assert_eq!(backend.pixel(2, 2), Color::RED.to_bits());
    assert_eq!(backend.pixel(3, 3), Color::BLACK.to_bits());
}

#[test]
fn test_fill_rect_alpha_composites() {
    let mut backend = ImmediateCompositionBackend::new(2, 2);
    backend.begin_frame(Color::BLACK);
    backend.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::WHITE.with_alpha(0.5));

    let c = Color::from_bits(backend.pixel(0, 0));
    assert!((c.r - 0.5).abs() < 0.01, "half-white over black, got {:?}", c);
}

#[test]
fn test_fill_rect_clips_to_buffer() {
    let mut backend = ImmediateCompositionBackend::new(2, 2);
    backend.begin_frame(Color::BLACK);
    backend.fill_rect(Rect::new(-10.0, -10.0, 100.0, 100.0), Color::GREEN);
    assert_eq!(backend.pixel(1, 1), Color::GREEN.to_bits());
}

// ============================================================================
// Quad blits
// ============================================================================

#[test]
fn test_draw_quads_blits_graphic() {
    let mut backend = ImmediateCompositionBackend::new(8, 8);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::RED);

    backend
        .draw_quads(&graphic, &plain_key(), &[one_quad(2.0, 2.0)], &params())
        .unwrap();

    assert_eq!(backend.pixel(1, 1), Color::BLACK.to_bits());
    assert_eq!(backend.pixel(2, 2), Color::RED.to_bits());
    assert_eq!(backend.pixel(5, 5), Color::RED.to_bits());
    assert_eq!(backend.pixel(6, 6), Color::BLACK.to_bits());
}

#[test]
fn test_draw_quads_color_mult() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::WHITE);
    let key = BatchKey::new(None, BatchFlags::COLOR_MULT, BlendMode::Normal, None);
    let quad = QuadGeom {
        color: Color::new(0.0, 1.0, 0.0, 1.0),
        ..one_quad(0.0, 0.0)
    };

    backend.draw_quads(&graphic, &key, &[quad], &params()).unwrap();
    assert_eq!(backend.pixel(1, 1), Color::GREEN.to_bits());
}

#[test]
fn test_draw_quads_color_offset() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::BLACK);
    let key = BatchKey::new(None, BatchFlags::COLOR_OFFSET, BlendMode::Normal, None);
    let quad = QuadGeom {
        offset: ColorOffset::new(1.0, 0.0, 0.0, 0.0),
        ..one_quad(0.0, 0.0)
    };

    backend.draw_quads(&graphic, &key, &[quad], &params()).unwrap();
    assert_eq!(backend.pixel(0, 0), Color::RED.to_bits());
}

#[test]
fn test_draw_quads_add_blend() {
    let mut backend = ImmediateCompositionBackend::new(2, 2);
    backend.begin_frame(Color::new(0.5, 0.0, 0.0, 1.0));
    let graphic = solid_graphic(Color::new(0.5, 0.0, 0.0, 1.0));
    let key = BatchKey::new(None, BatchFlags::empty(), BlendMode::Add, None);
    let quad = QuadGeom {
        source: Rect::new(0.0, 0.0, 2.0, 2.0),
        ..one_quad(0.0, 0.0)
    };

    backend.draw_quads(&graphic, &key, &[quad], &params()).unwrap();
    let c = Color::from_bits(backend.pixel(0, 0));
    assert!((c.r - 1.0).abs() < 0.01, "0.5 + 0.5 additive, got {:?}", c);
}

#[test]
fn test_draw_quads_off_buffer_is_clipped() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::RED);

    // Entirely outside: nothing drawn, nothing panics.
    backend
        .draw_quads(&graphic, &plain_key(), &[one_quad(100.0, 100.0)], &params())
        .unwrap();
    for y in 0..4 {
        for x in 0..4 {
            assert_eq!(backend.pixel(x, y), Color::BLACK.to_bits());
        }
    }
}

#[test]
fn test_draw_quads_respects_playback_transform() {
    let mut backend = ImmediateCompositionBackend::new(8, 8);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::RED);
    let shifted = PlaybackParams::new(
        Affine2::from_translation(Vec2::new(4.0, 0.0)),
        Rect::new(0.0, 0.0, 8.0, 8.0),
    );

    backend
        .draw_quads(&graphic, &plain_key(), &[one_quad(0.0, 0.0)], &shifted)
        .unwrap();
    assert_eq!(backend.pixel(0, 0), Color::BLACK.to_bits());
    assert_eq!(backend.pixel(4, 0), Color::RED.to_bits());
}

// ============================================================================
// Triangles
// ============================================================================

#[test]
fn test_draw_triangles_fills_interior() {
    let mut backend = ImmediateCompositionBackend::new(8, 8);
    backend.begin_frame(Color::BLACK);

    let geometry = TriangleGeometry {
        positions: vec![Vec2::new(0.0, 0.0), Vec2::new(8.0, 0.0), Vec2::new(0.0, 8.0)],
        uvs: Vec::new(),
        colors: vec![Color::GREEN; 3],
        indices: vec![0, 1, 2],
        bounds: Some(Rect::new(0.0, 0.0, 8.0, 8.0)),
    };

    backend
        .draw_triangles(None, &plain_key(), &geometry, &params())
        .unwrap();

    // Inside the triangle (upper-left half)
    assert_eq!(backend.pixel(1, 1), Color::GREEN.to_bits());
    // Outside (lower-right corner)
    assert_eq!(backend.pixel(7, 7), Color::BLACK.to_bits());
}

#[test]
fn test_draw_triangles_degenerate_is_skipped() {
    let mut backend = ImmediateCompositionBackend::new(4, 4);
    backend.begin_frame(Color::BLACK);

    let geometry = TriangleGeometry {
        positions: vec![Vec2::ZERO, Vec2::ZERO, Vec2::ZERO],
        uvs: Vec::new(),
        colors: Vec::new(),
        indices: vec![0, 1, 2],
        bounds: None,
    };
    backend
        .draw_triangles(None, &plain_key(), &geometry, &params())
        .unwrap();
    assert_eq!(backend.pixel(0, 0), Color::BLACK.to_bits());
}

// ============================================================================
// Present
// ============================================================================

#[test]
fn test_present_applies_tint_and_alpha() {
    let mut backend = ImmediateCompositionBackend::new(2, 2);
    backend.begin_frame(Color::WHITE);

    let stats = backend
        .present(&PresentParams {
            tint: Color::new(1.0, 0.0, 0.0, 1.0),
            alpha: 0.5,
            ..present_identity()
        })
        .unwrap();
    assert_eq!(stats.draw_calls, 0);

    let c = Color::from_bits(backend.pixel(0, 0));
    assert!((c.r - 1.0).abs() < 0.01);
    assert!(c.g < 0.01);
    assert!((c.a - 0.5).abs() < 0.01);
}

#[test]
fn test_stats_count_batches_and_items() {
    let mut backend = ImmediateCompositionBackend::new(8, 8);
    backend.begin_frame(Color::BLACK);
    let graphic = solid_graphic(Color::RED);

    backend
        .draw_quads(&graphic, &plain_key(), &[one_quad(0.0, 0.0), one_quad(4.0, 4.0)], &params())
        .unwrap();
    backend.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Color::WHITE);

    let stats = backend.present(&present_identity()).unwrap();
    assert_eq!(stats.draw_calls, 2);
    assert_eq!(stats.quads, 2);
    assert_eq!(stats.triangles, 0);
}
