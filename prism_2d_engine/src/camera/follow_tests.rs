//! Unit tests for follow.rs
//!
//! Deadzone derivation per style, scroll targeting, framerate-independent
//! smoothing, bounds clamping, and lead.

use std::cell::Cell;
use std::rc::Rc;
use glam::Vec2;
use crate::camera::viewport::Viewport;
use crate::geom::Rect;
use super::*;

/// Movable test target with optional position history.
struct TestTarget {
    pos: Cell<Vec2>,
    size: Vec2,
    keeps_history: bool,
}

impl TestTarget {
    fn new(x: f32, y: f32, w: f32, h: f32) -> Rc<Self> {
        Rc::new(Self {
            pos: Cell::new(Vec2::new(x, y)),
            size: Vec2::new(w, h),
            keeps_history: false,
        })
    }

    fn with_history(x: f32, y: f32, w: f32, h: f32) -> Rc<Self> {
        Rc::new(Self {
            pos: Cell::new(Vec2::new(x, y)),
            size: Vec2::new(w, h),
            keeps_history: true,
        })
    }

    fn move_to(&self, x: f32, y: f32) {
        self.pos.set(Vec2::new(x, y));
    }
}

impl FollowTarget for TestTarget {
    fn position(&self) -> Vec2 {
        self.pos.get()
    }

    fn size(&self) -> Vec2 {
        self.size
    }

    fn last_position(&self) -> Option<Vec2> {
        self.keeps_history.then(|| self.pos.get())
    }
}

fn viewport() -> Viewport {
    Viewport::new(800, 600, 1.0)
}

fn close(a: Vec2, b: Vec2) -> bool {
    (a - b).length() < 1e-3
}

// ============================================================================
// Deadzone derivation
// ============================================================================

#[test]
fn test_lockon_deadzone_matches_target_size() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 32.0, 32.0), FollowStyle::LockOn, 1.0);
    assert_eq!(state.deadzone(), Some(Rect::new(384.0, 276.0, 32.0, 32.0)));
}

#[test]
fn test_platformer_deadzone() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::Platformer, 1.0);
    // w/8 x h/3, centered, raised by a quarter of its height
    assert_eq!(state.deadzone(), Some(Rect::new(350.0, 150.0, 100.0, 200.0)));
}

#[test]
fn test_topdown_deadzones_are_centered_squares() {
    let vp = viewport();
    let mut state = FollowState::new();

    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::TopDown, 1.0);
    assert_eq!(state.deadzone(), Some(Rect::new(300.0, 200.0, 200.0, 200.0)));

    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::TopDownTight, 1.0);
    assert_eq!(state.deadzone(), Some(Rect::new(350.0, 250.0, 100.0, 100.0)));
}

#[test]
fn test_screen_by_screen_deadzone_is_camera_rect() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::ScreenByScreen, 1.0);
    assert_eq!(state.deadzone(), Some(Rect::new(0.0, 0.0, 800.0, 600.0)));
}

#[test]
fn test_no_dead_zone_clears_deadzone() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::LockOn, 1.0);
    assert!(state.deadzone().is_some());
    state.follow(&vp, TestTarget::new(0.0, 0.0, 16.0, 16.0), FollowStyle::NoDeadZone, 1.0);
    assert!(state.deadzone().is_none());
}

#[test]
fn test_deadzone_is_a_snapshot() {
    // Recomputed only at follow() time; later camera resizes leave it alone.
    let mut vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 32.0, 32.0), FollowStyle::LockOn, 1.0);
    let before = state.deadzone();
    vp.set_size(400, 300);
    assert_eq!(state.deadzone(), before);
}

// ============================================================================
// Scroll targeting
// ============================================================================

#[test]
fn test_no_deadzone_centers_target_midpoint() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(1000.0, 500.0, 32.0, 32.0);
    state.follow(&vp, target, FollowStyle::NoDeadZone, 1.0);
    state.update(&vp, 1.0 / 60.0);
    // midpoint (1016, 516) minus half the camera (400, 300)
    assert!(close(state.scroll(), Vec2::new(616.0, 216.0)));
}

#[test]
fn test_target_inside_deadzone_does_not_move_camera() {
    let vp = viewport();
    let mut state = FollowState::new();
    // TopDown deadzone is (300, 200, 200, 200): plenty of slack.
    let target = TestTarget::new(390.0, 280.0, 32.0, 32.0);
    state.follow(&vp, target.clone(), FollowStyle::TopDown, 1.0);
    state.update(&vp, 1.0 / 60.0);
    assert_eq!(state.scroll(), Vec2::ZERO);

    // Wandering within the zone still moves nothing.
    target.move_to(460.0, 350.0);
    state.update(&vp, 1.0 / 60.0);
    assert_eq!(state.scroll(), Vec2::ZERO);
}

#[test]
fn test_deadzone_containment_after_snap() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(2000.0, -750.0, 32.0, 32.0);
    state.follow(&vp, target.clone(), FollowStyle::TopDownTight, 1.0);
    state.snap_to_target(&vp, 1.0 / 60.0);

    let deadzone_world = state.deadzone().unwrap().offset_by(state.scroll());
    let target_rect = Rect::new(target.position().x, target.position().y, 32.0, 32.0);
    assert!(
        deadzone_world.contains_rect(&target_rect),
        "target {:?} outside deadzone {:?}",
        target_rect,
        deadzone_world
    );
}

#[test]
fn test_deadzone_pushes_only_as_far_as_needed() {
    let vp = viewport();
    let mut state = FollowState::new();
    // Deadzone (384, 276, 32, 32); target 10 px right of the zone.
    let target = TestTarget::new(426.0, 276.0, 32.0, 32.0);
    state.follow(&vp, target, FollowStyle::LockOn, 1.0);
    state.update(&vp, 1.0 / 60.0);
    // x clamp: scroll = targetRight - deadzoneRight = 458 - 416 = 42
    assert!(close(state.scroll(), Vec2::new(42.0, 0.0)));
}

// ============================================================================
// Smoothing
// ============================================================================

#[test]
fn test_lerp_one_snaps_regardless_of_elapsed() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(5000.0, 5000.0, 8.0, 8.0);
    state.follow(&vp, target, FollowStyle::NoDeadZone, 1.0);
    state.update(&vp, 0.0001);
    assert_eq!(state.scroll(), state.scroll_target());
}

#[test]
fn test_smoothing_monotonically_converges() {
    let vp = viewport();
    for lerp in [0.05f32, 0.3, 0.9] {
        let mut state = FollowState::new();
        let target = TestTarget::new(5000.0, 0.0, 8.0, 8.0);
        state.follow(&vp, target, FollowStyle::NoDeadZone, lerp);

        let mut last_distance = f32::INFINITY;
        for _ in 0..200 {
            state.update(&vp, 1.0 / 60.0);
            let distance = (state.scroll_target() - state.scroll()).length();
            if distance < 0.01 {
                last_distance = distance;
                break; // converged to f32 resolution
            }
            assert!(
                distance < last_distance,
                "distance must strictly decrease (lerp {})",
                lerp
            );
            last_distance = distance;
        }
        assert!(last_distance < 50.0, "must approach target (lerp {})", lerp);
    }
}

#[test]
fn test_smoothing_is_framerate_independent_at_equal_total_time() {
    // One 0.5s step covers the same fraction as the limit of many small
    // steps only in the exponential sense: both must land near the target
    // after enough total time.
    let vp = viewport();
    let build = |lerp: f32| {
        let mut s = FollowState::new();
        s.follow(&vp, TestTarget::new(1000.0, 0.0, 8.0, 8.0), FollowStyle::NoDeadZone, lerp);
        s
    };

    let mut coarse = build(0.5);
    coarse.update(&vp, 1.0);
    let mut fine = build(0.5);
    for _ in 0..60 {
        fine.update(&vp, 1.0 / 60.0);
    }
    let d_coarse = (coarse.scroll_target() - coarse.scroll()).length();
    let d_fine = (fine.scroll_target() - fine.scroll()).length();
    // Both are deep into convergence after a full second at lerp 0.5.
    assert!(d_coarse < 1.0);
    assert!(d_fine < 1.0);
}

// ============================================================================
// ScreenByScreen
// ============================================================================

#[test]
fn test_screen_by_screen_jumps_one_view() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(10.0, 10.0, 16.0, 16.0);
    state.follow(&vp, target.clone(), FollowStyle::ScreenByScreen, 1.0);
    state.update(&vp, 1.0 / 60.0);
    assert_eq!(state.scroll(), Vec2::ZERO);

    // Crossing the right view edge jumps exactly one view width.
    target.move_to(805.0, 10.0);
    state.update(&vp, 1.0 / 60.0);
    assert!(close(state.scroll(), Vec2::new(800.0, 0.0)));

    // Crossing back left jumps back.
    target.move_to(700.0, 10.0);
    state.update(&vp, 1.0 / 60.0);
    assert!(close(state.scroll(), Vec2::ZERO));
}

#[test]
fn test_screen_by_screen_clamps_jump_to_bounds() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(810.0, 10.0, 16.0, 16.0);
    state.follow(&vp, target, FollowStyle::ScreenByScreen, 1.0);
    state.set_scroll_bounds(Some(0.0), Some(1000.0), Some(0.0), Some(600.0));
    state.update(&vp, 1.0 / 60.0);
    // A full jump would reach 800; the max bound caps it at 1000 - 800 = 200.
    assert!(close(state.scroll(), Vec2::new(200.0, 0.0)));
}

// ============================================================================
// Lead
// ============================================================================

#[test]
fn test_lead_adds_velocity_term() {
    let vp = viewport();
    let mut state = FollowState::new();
    // TopDown: the target moves inside the (300, 200, 200, 200) zone, so
    // any scroll change comes from the lead term alone.
    let target = TestTarget::with_history(392.0, 290.0, 16.0, 16.0);
    state.follow(&vp, target.clone(), FollowStyle::TopDown, 1.0);
    state.set_lead(Vec2::new(2.0, 0.0));

    // First update primes the cache: no lead yet.
    state.update(&vp, 1.0 / 60.0);
    assert_eq!(state.scroll_target(), Vec2::ZERO);

    // Moving 10 px right inside the zone adds lead of 10 * 2.
    target.move_to(402.0, 290.0);
    state.update(&vp, 1.0 / 60.0);
    assert!(close(state.scroll_target(), Vec2::new(20.0, 0.0)));
}

#[test]
fn test_no_lead_without_history() {
    let vp = viewport();
    let mut state = FollowState::new();
    let target = TestTarget::new(392.0, 290.0, 16.0, 16.0);
    state.follow(&vp, target.clone(), FollowStyle::TopDown, 1.0);
    state.set_lead(Vec2::new(2.0, 2.0));

    state.update(&vp, 1.0 / 60.0);
    target.move_to(402.0, 290.0);
    state.update(&vp, 1.0 / 60.0);
    // Target stays inside the deadzone and history is off: no motion at all.
    assert_eq!(state.scroll(), Vec2::ZERO);
}

// ============================================================================
// Bounds
// ============================================================================

#[test]
fn test_bind_scroll_pos_partial_bounds() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.set_scroll_bounds(Some(0.0), None, None, Some(1000.0));

    let bound = state.bind_scroll_pos(&vp, Vec2::new(-50.0, 900.0));
    assert_eq!(bound.x, 0.0);
    // max_y - margin_bottom = 1000 - 600 = 400
    assert_eq!(bound.y, 400.0);

    // Unbounded sides pass through.
    let free = state.bind_scroll_pos(&vp, Vec2::new(9999.0, -9999.0));
    assert_eq!(free.x, 9999.0);
    assert_eq!(free.y, -9999.0);
}

#[test]
fn test_bind_scroll_pos_uses_margins() {
    let mut vp = viewport();
    vp.set_zoom(2.0); // margins (200, 150), view 400x300
    let mut state = FollowState::new();
    state.set_scroll_bounds(Some(0.0), Some(800.0), None, None);

    // min_x - margin_left = -200; max_x - margin_right = 800 - 600 = 200
    assert_eq!(state.bind_scroll_pos(&vp, Vec2::new(-500.0, 0.0)).x, -200.0);
    assert_eq!(state.bind_scroll_pos(&vp, Vec2::new(500.0, 0.0)).x, 200.0);
}

#[test]
fn test_apply_bounds_clamps_current_scroll() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.set_scroll(Vec2::new(-100.0, 50.0));
    state.set_scroll_bounds(Some(0.0), None, None, None);
    state.apply_bounds(&vp);
    assert_eq!(state.scroll(), Vec2::new(0.0, 50.0));
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_unfollow_clears_state() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.follow(&vp, TestTarget::new(0.0, 0.0, 8.0, 8.0), FollowStyle::LockOn, 0.5);
    assert!(state.has_target());
    state.unfollow();
    assert!(!state.has_target());
    assert!(state.deadzone().is_none());
    assert!(state.style().is_none());

    // Updates with no target leave scroll untouched.
    let before = state.scroll();
    state.update(&vp, 1.0 / 60.0);
    assert_eq!(state.scroll(), before);
}

#[test]
fn test_focus_on_centers_point() {
    let vp = viewport();
    let mut state = FollowState::new();
    state.focus_on(&vp, Vec2::new(1000.0, 1000.0));
    assert_eq!(state.scroll(), Vec2::new(600.0, 700.0));
}
