//! Unit tests for graphic.rs
//!
//! These tests validate Graphic construction, GraphicStore lifecycle via
//! SlotMap keys, the name index, and stale-key behavior after destroy.

use super::*;

fn checker(name: &str) -> Graphic {
    // 2x2: white, red / red, white
    let w = Color::WHITE.to_bits();
    let r = Color::RED.to_bits();
    Graphic::new(name, 2, 2, vec![w, r, r, w]).unwrap()
}

// ============================================================================
// Graphic construction
// ============================================================================

#[test]
fn test_graphic_new_validates_pixel_length() {
    let result = Graphic::new("bad", 2, 2, vec![0; 3]);
    assert!(result.is_err());
}

#[test]
fn test_graphic_new_rejects_zero_dimension() {
    assert!(Graphic::new("bad", 0, 2, vec![]).is_err());
    assert!(Graphic::new("bad", 2, 0, vec![]).is_err());
}

#[test]
fn test_graphic_solid() {
    let g = Graphic::solid("fill", 4, 3, Color::BLUE).unwrap();
    assert_eq!(g.width(), 4);
    assert_eq!(g.height(), 3);
    assert_eq!(g.pixels().len(), 12);
    assert!(g.pixels().iter().all(|&p| p == Color::BLUE.to_bits()));
}

#[test]
fn test_texel_access() {
    let g = checker("checker");
    assert_eq!(g.texel(0, 0), Color::WHITE.to_bits());
    assert_eq!(g.texel(1, 0), Color::RED.to_bits());
    assert_eq!(g.texel(0, 1), Color::RED.to_bits());
}

#[test]
fn test_texel_out_of_range_is_transparent() {
    let g = checker("checker");
    assert_eq!(g.texel(-1, 0), 0);
    assert_eq!(g.texel(0, 2), 0);
    assert_eq!(g.texel(2, 0), 0);
}

// ============================================================================
// GraphicStore lifecycle
// ============================================================================

#[test]
fn test_store_insert_and_get() {
    let mut store = GraphicStore::new();
    let key = store.insert(checker("a")).unwrap();
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(key).unwrap().name(), "a");
}

#[test]
fn test_store_rejects_duplicate_name() {
    let mut store = GraphicStore::new();
    store.insert(checker("a")).unwrap();
    assert!(store.insert(checker("a")).is_err());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_store_lookup_by_name() {
    let mut store = GraphicStore::new();
    let key = store.insert(checker("tiles")).unwrap();
    assert_eq!(store.lookup("tiles"), Some(key));
    assert_eq!(store.lookup("missing"), None);
}

#[test]
fn test_destroy_makes_key_stale() {
    let mut store = GraphicStore::new();
    let key = store.insert(checker("a")).unwrap();
    assert!(store.destroy(key));
    assert!(store.get(key).is_none());
    assert_eq!(store.lookup("a"), None);
    assert!(store.is_empty());
}

#[test]
fn test_destroy_twice_is_false() {
    let mut store = GraphicStore::new();
    let key = store.insert(checker("a")).unwrap();
    assert!(store.destroy(key));
    assert!(!store.destroy(key));
}

#[test]
fn test_keys_survive_other_removals() {
    let mut store = GraphicStore::new();
    let a = store.insert(checker("a")).unwrap();
    let b = store.insert(checker("b")).unwrap();
    store.destroy(a);
    assert_eq!(store.get(b).unwrap().name(), "b");
    // Name freed by destroy can be reused
    let a2 = store.insert(checker("a")).unwrap();
    assert_ne!(a, a2);
    assert!(store.get(a).is_none());
}
