//! Unit tests for color.rs

use super::*;

// ============================================================================
// Packing
// ============================================================================

#[test]
fn test_bits_roundtrip() {
    let bits = 0x40_80_C0_FF;
    let color = Color::from_bits(bits);
    assert_eq!(color.to_bits(), bits);
}

#[test]
fn test_to_bits_clamps() {
    let color = Color::new(2.0, -1.0, 0.5, 1.5);
    let bits = color.to_bits();
    assert_eq!(bits >> 24, 0xFF);
    assert_eq!((bits >> 16) & 0xFF, 0x00);
    assert_eq!(bits & 0xFF, 0xFF);
}

#[test]
fn test_from_rgb8_is_opaque() {
    let color = Color::from_rgb8(0x12, 0x34, 0x56);
    assert_eq!(color.to_bits(), 0x12_34_56_FF);
    assert_eq!(color.a, 1.0);
}

// ============================================================================
// Operations
// ============================================================================

#[test]
fn test_multiply_tint() {
    let tinted = Color::WHITE.multiply(&Color::new(0.5, 0.25, 1.0, 1.0));
    assert_eq!(tinted, Color::new(0.5, 0.25, 1.0, 1.0));
}

#[test]
fn test_with_alpha() {
    let c = Color::RED.with_alpha(0.5);
    assert_eq!(c.r, 1.0);
    assert_eq!(c.a, 0.5);
}

#[test]
fn test_identity_multiplier() {
    assert!(Color::WHITE.is_identity_multiplier());
    assert!(!Color::RED.is_identity_multiplier());
}

// ============================================================================
// ColorOffset
// ============================================================================

#[test]
fn test_offset_identity() {
    assert!(ColorOffset::ZERO.is_zero());
    assert!(ColorOffset::default().is_zero());
    assert!(!ColorOffset::new(0.1, 0.0, 0.0, 0.0).is_zero());
}

#[test]
fn test_offset_apply() {
    let shifted = ColorOffset::new(0.25, 0.0, -0.5, 0.0).apply(&Color::new(0.5, 0.5, 0.75, 1.0));
    assert!((shifted.r - 0.75).abs() < 1e-6);
    assert!((shifted.g - 0.5).abs() < 1e-6);
    assert!((shifted.b - 0.25).abs() < 1e-6);
}

#[test]
fn test_offset_apply_then_clamp() {
    let shifted = ColorOffset::new(1.0, 0.0, 0.0, 0.0)
        .apply(&Color::new(0.9, 0.5, 0.5, 1.0))
        .clamped();
    assert_eq!(shifted.r, 1.0);
}
