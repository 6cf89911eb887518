//! Follow/deadzone controller — scroll targeting and smoothing.
//!
//! The controller computes a scroll target from a tracked object and a
//! style-specific deadzone, smooths scroll toward it framerate-independently,
//! and clamps the result to the camera's scroll bounds. The deadzone is a
//! snapshot: it is derived once in `follow()` from the camera and target
//! sizes at that instant and never re-derived afterwards.

use std::rc::Rc;
use glam::Vec2;
use crate::camera::viewport::Viewport;
use crate::geom::Rect;

/// Tracked-object capability consumed by the follow controller.
///
/// Implementors expose world position and size; `last_position` opts into
/// lead computation (anticipatory scroll proportional to recent velocity).
pub trait FollowTarget {
    /// World position of the object's top-left corner.
    fn position(&self) -> Vec2;

    /// Object size in world units.
    fn size(&self) -> Vec2;

    /// Position at the previous tick, when the object keeps history.
    /// Returning `Some` enables the camera's lead term.
    fn last_position(&self) -> Option<Vec2> {
        None
    }
}

/// Deadzone styles.
///
/// There are no transitions between styles except explicit `follow()` calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStyle {
    /// Deadzone matched to the target's own size, slightly above center
    LockOn,
    /// Narrow horizontal band, tall enough for jumps
    Platformer,
    /// Centered square, max(width, height) / 4 per side
    TopDown,
    /// Centered square, max(width, height) / 8 per side
    TopDownTight,
    /// Deadzone is the whole camera: scroll jumps a full view at a time
    ScreenByScreen,
    /// No deadzone: scroll centers the target every update
    NoDeadZone,
}

/// Scroll state of one camera.
#[derive(Default)]
pub struct FollowState {
    target: Option<Rc<dyn FollowTarget>>,
    style: Option<FollowStyle>,
    deadzone: Option<Rect>,
    lerp: f32,
    /// Offset added to the target position before deadzone math
    offset: Vec2,
    /// Lead factor per axis (0 disables)
    lead: Vec2,
    last_target_position: Option<Vec2>,
    scroll: Vec2,
    scroll_target: Vec2,
    min_scroll_x: Option<f32>,
    max_scroll_x: Option<f32>,
    min_scroll_y: Option<f32>,
    max_scroll_y: Option<f32>,
}

impl FollowState {
    pub fn new() -> Self {
        Self {
            lerp: 1.0,
            ..Self::default()
        }
    }

    // ===== TARGETING =====

    /// Start following `target` with `style`.
    ///
    /// Stores target, style and lerp, discards the last-position cache, and
    /// computes a fresh deadzone from the camera size and the target size —
    /// at this call only. `lerp` is clamped into [0,1]; 1 snaps.
    pub fn follow(
        &mut self,
        viewport: &Viewport,
        target: Rc<dyn FollowTarget>,
        style: FollowStyle,
        lerp: f32,
    ) {
        self.deadzone = Self::compute_deadzone(style, viewport.size(), target.size());
        self.target = Some(target);
        self.style = Some(style);
        self.lerp = lerp.clamp(0.0, 1.0);
        self.last_target_position = None;
    }

    /// Stop following. Clears target, style and deadzone; scroll stays put.
    pub fn unfollow(&mut self) {
        self.target = None;
        self.style = None;
        self.deadzone = None;
        self.last_target_position = None;
    }

    /// Style-specific deadzone, camera-local coordinates.
    fn compute_deadzone(style: FollowStyle, camera_size: Vec2, target_size: Vec2) -> Option<Rect> {
        let (w, h) = (camera_size.x, camera_size.y);
        match style {
            FollowStyle::LockOn => {
                let (dw, dh) = (target_size.x, target_size.y);
                Some(Rect::new((w - dw) / 2.0, (h - dh) / 2.0 - dh * 0.25, dw, dh))
            }
            FollowStyle::Platformer => {
                let (dw, dh) = (w / 8.0, h / 3.0);
                Some(Rect::new((w - dw) / 2.0, (h - dh) / 2.0 - dh * 0.25, dw, dh))
            }
            FollowStyle::TopDown => {
                let side = w.max(h) / 4.0;
                Some(Rect::new((w - side) / 2.0, (h - side) / 2.0, side, side))
            }
            FollowStyle::TopDownTight => {
                let side = w.max(h) / 8.0;
                Some(Rect::new((w - side) / 2.0, (h - side) / 2.0, side, side))
            }
            FollowStyle::ScreenByScreen => Some(Rect::new(0.0, 0.0, w, h)),
            FollowStyle::NoDeadZone => None,
        }
    }

    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }

    pub fn style(&self) -> Option<FollowStyle> {
        self.style
    }

    pub fn deadzone(&self) -> Option<Rect> {
        self.deadzone
    }

    pub fn lerp(&self) -> f32 {
        self.lerp
    }

    pub fn set_target_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    pub fn set_lead(&mut self, lead: Vec2) {
        self.lead = lead;
    }

    // ===== SCROLL =====

    /// World-space top-left of the view.
    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    /// Pre-smoothing scroll destination.
    pub fn scroll_target(&self) -> Vec2 {
        self.scroll_target
    }

    /// Place scroll directly (both current and target).
    pub fn set_scroll(&mut self, scroll: Vec2) {
        self.scroll = scroll;
        self.scroll_target = scroll;
    }

    /// Center the view on a world point.
    pub fn focus_on(&mut self, viewport: &Viewport, point: Vec2) {
        self.set_scroll(point - viewport.size() * 0.5);
    }

    /// Set scroll bounds; `None` leaves that side unbounded.
    pub fn set_scroll_bounds(
        &mut self,
        min_x: Option<f32>,
        max_x: Option<f32>,
        min_y: Option<f32>,
        max_y: Option<f32>,
    ) {
        self.min_scroll_x = min_x;
        self.max_scroll_x = max_x;
        self.min_scroll_y = min_y;
        self.max_scroll_y = max_y;
    }

    /// Clamp a scroll position into the bounds adjusted by view margins.
    /// A lower bound wins over a conflicting upper bound.
    pub fn bind_scroll_pos(&self, viewport: &Viewport, pos: Vec2) -> Vec2 {
        let mut bound = pos;
        if let Some(max_x) = self.max_scroll_x {
            bound.x = bound.x.min(max_x - viewport.margin_right());
        }
        if let Some(min_x) = self.min_scroll_x {
            bound.x = bound.x.max(min_x - viewport.margin_left());
        }
        if let Some(max_y) = self.max_scroll_y {
            bound.y = bound.y.min(max_y - viewport.margin_bottom());
        }
        if let Some(min_y) = self.min_scroll_y {
            bound.y = bound.y.max(min_y - viewport.margin_top());
        }
        bound
    }

    // ===== PER-FRAME UPDATE =====

    /// Advance scroll toward the tracked target.
    ///
    /// Recomputes `scroll_target` per the active style, applies the lead
    /// term when the target keeps history, then smooths `scroll` toward the
    /// target with the framerate-independent factor
    /// `1 − e^(−elapsed·lerp·60)`. A lerp of 1 snaps.
    pub fn update(&mut self, viewport: &Viewport, elapsed: f32) {
        let Some(target) = self.target.clone() else {
            return;
        };

        match self.deadzone {
            None => {
                let midpoint = target.position() + target.size() * 0.5 + self.offset;
                self.scroll_target = midpoint - viewport.size() * 0.5;
            }
            Some(deadzone) => {
                let target_pos = target.position() + self.offset;
                let target_size = target.size();

                if self.style == Some(FollowStyle::ScreenByScreen) {
                    let view = viewport.view_rect(self.scroll);
                    if target_pos.x >= view.right() {
                        self.scroll_target.x += view.width;
                    } else if target_pos.x + target_size.x < view.x {
                        self.scroll_target.x -= view.width;
                    }
                    if target_pos.y >= view.bottom() {
                        self.scroll_target.y += view.height;
                    } else if target_pos.y + target_size.y < view.y {
                        self.scroll_target.y -= view.height;
                    }
                    // Clamp the jump immediately so style switches mid-scroll
                    // cannot leave a drifted target behind.
                    self.scroll_target = self.bind_scroll_pos(viewport, self.scroll_target);
                } else {
                    // Four one-sided clamps in fixed order: x-min, x-max,
                    // y-min, y-max. Each pushes scroll_target only far
                    // enough to keep the target's edges inside the deadzone.
                    let mut edge = target_pos.x - deadzone.x;
                    if self.scroll_target.x > edge {
                        self.scroll_target.x = edge;
                    }
                    edge = target_pos.x + target_size.x - deadzone.x - deadzone.width;
                    if self.scroll_target.x < edge {
                        self.scroll_target.x = edge;
                    }
                    edge = target_pos.y - deadzone.y;
                    if self.scroll_target.y > edge {
                        self.scroll_target.y = edge;
                    }
                    edge = target_pos.y + target_size.y - deadzone.y - deadzone.height;
                    if self.scroll_target.y < edge {
                        self.scroll_target.y = edge;
                    }
                }

                if target.last_position().is_some() {
                    let pos = target.position();
                    let previous = self.last_target_position.unwrap_or(pos);
                    self.scroll_target += (pos - previous) * self.lead;
                    self.last_target_position = Some(pos);
                }
            }
        }

        if self.lerp >= 1.0 {
            self.scroll = self.scroll_target;
        } else {
            let factor = 1.0 - (-elapsed * self.lerp * 60.0).exp();
            self.scroll += (self.scroll_target - self.scroll) * factor;
        }
    }

    /// Clamp the current scroll into bounds. Runs every frame after the
    /// follow update, and after direct scroll writes.
    pub fn apply_bounds(&mut self, viewport: &Viewport) {
        self.scroll = self.bind_scroll_pos(viewport, self.scroll);
    }

    /// Update once, then bypass smoothing entirely.
    pub fn snap_to_target(&mut self, viewport: &Viewport, elapsed: f32) {
        self.update(viewport, elapsed);
        self.scroll = self.scroll_target;
        self.apply_bounds(viewport);
    }
}

#[cfg(test)]
#[path = "follow_tests.rs"]
mod tests;
