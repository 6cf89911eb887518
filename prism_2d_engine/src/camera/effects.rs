//! Effect timers — flash, fade, and shake.
//!
//! Three independent countdowns. Each is idempotent against re-trigger
//! unless forced, coerces non-positive durations to a minimal positive
//! epsilon, and fires its completion handler at most once per activation
//! (the handler is a single-shot closure, taken on fire).

use bitflags::bitflags;
use glam::Vec2;
use rand::Rng;
use crate::color::Color;

/// Smallest accepted effect duration. Requests at or below zero become this,
/// so the effect completes on the very next tick instead of dividing by zero.
const MIN_DURATION: f32 = 0.000_001;

/// Completion handler: zero-argument, fired at most once.
pub(crate) type EffectCallback = Box<dyn FnOnce()>;

fn coerce_duration(duration: f32) -> f32 {
    if duration <= 0.0 {
        MIN_DURATION
    } else {
        duration
    }
}

bitflags! {
    /// Axes a shake may jitter on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShakeAxes: u8 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const XY = Self::X.bits() | Self::Y.bits();
    }
}

impl Default for ShakeAxes {
    fn default() -> Self {
        ShakeAxes::XY
    }
}

// ============================================================================
// Flash
// ============================================================================

/// Full-screen color burst fading out over its duration.
#[derive(Default)]
pub(crate) struct FlashEffect {
    color: Color,
    duration: f32,
    alpha: f32,
    on_complete: Option<EffectCallback>,
}

impl FlashEffect {
    /// Begin a flash. Ignored while one is active unless `force`.
    pub fn start(
        &mut self,
        color: Color,
        duration: f32,
        on_complete: Option<EffectCallback>,
        force: bool,
    ) {
        if !force && self.is_active() {
            return;
        }
        self.color = color;
        self.duration = coerce_duration(duration);
        self.alpha = 1.0;
        self.on_complete = on_complete;
    }

    pub fn is_active(&self) -> bool {
        self.alpha > 0.0
    }

    /// Advance the countdown; fires the handler once on completion.
    pub fn update(&mut self, elapsed: f32) {
        if self.alpha <= 0.0 {
            return;
        }
        self.alpha -= elapsed / self.duration;
        if self.alpha <= 0.0 {
            self.alpha = 0.0;
            self.duration = 0.0;
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
        }
    }

    /// Stop immediately; the handler does not fire.
    pub fn stop(&mut self) {
        self.alpha = 0.0;
        self.duration = 0.0;
        self.on_complete = None;
    }

    /// Composited fill color for this frame, or `None` when inactive.
    pub fn fill_color(&self) -> Option<Color> {
        if self.alpha > 0.0 {
            Some(self.color.with_alpha(self.alpha * self.color.a))
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

// ============================================================================
// Fade
// ============================================================================

/// Full-screen cover that fades in (reveal) or out (cover).
///
/// Fade-in starts just below full cover and reveals toward 0; fade-out
/// starts just above 0 and covers toward 1, where the cover then holds
/// until the next fade or `stop`.
#[derive(Default)]
pub(crate) struct FadeEffect {
    color: Color,
    duration: f32,
    fade_in: bool,
    alpha: f32,
    on_complete: Option<EffectCallback>,
}

impl FadeEffect {
    /// Begin a fade. Ignored while one is running unless `force`.
    pub fn start(
        &mut self,
        color: Color,
        duration: f32,
        fade_in: bool,
        on_complete: Option<EffectCallback>,
        force: bool,
    ) {
        if !force && self.is_active() {
            return;
        }
        self.color = color;
        self.duration = coerce_duration(duration);
        self.fade_in = fade_in;
        self.alpha = if fade_in { 0.999_999 } else { 0.000_001 };
        self.on_complete = on_complete;
    }

    /// A fade is active while its countdown is running. A finished cover
    /// (alpha held at 1) is no longer active and can be faded back in.
    pub fn is_active(&self) -> bool {
        self.duration > 0.0
    }

    /// Advance toward the terminal bound; fires the handler once there.
    pub fn update(&mut self, elapsed: f32) {
        if self.duration <= 0.0 {
            return;
        }
        if self.fade_in {
            self.alpha -= elapsed / self.duration;
            if self.alpha <= 0.0 {
                self.alpha = 0.0;
                self.duration = 0.0;
            }
        } else {
            self.alpha += elapsed / self.duration;
            if self.alpha >= 1.0 {
                self.alpha = 1.0;
                self.duration = 0.0;
            }
        }
        if self.duration == 0.0 {
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
        }
    }

    /// Stop immediately and drop the cover; the handler does not fire.
    pub fn stop(&mut self) {
        self.alpha = 0.0;
        self.duration = 0.0;
        self.on_complete = None;
    }

    /// Composited fill color for this frame, or `None` when fully revealed.
    pub fn fill_color(&self) -> Option<Color> {
        if self.alpha > 0.0 {
            Some(self.color.with_alpha(self.alpha * self.color.a))
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

// ============================================================================
// Shake
// ============================================================================

/// Presentation jitter: a per-tick random offset on the enabled axes.
///
/// The offset applies to the camera's presentation position only, never to
/// scroll, so world↔screen mapping used for hit-testing is unaffected.
#[derive(Default)]
pub(crate) struct ShakeEffect {
    intensity: f32,
    duration: f32,
    axes: ShakeAxes,
    on_complete: Option<EffectCallback>,
}

impl ShakeEffect {
    /// Begin a shake. Unlike flash/fade, callers conventionally pass
    /// `force = true`; an active shake is only preserved when `force` is
    /// explicitly false.
    pub fn start(
        &mut self,
        intensity: f32,
        duration: f32,
        on_complete: Option<EffectCallback>,
        force: bool,
        axes: ShakeAxes,
    ) {
        if !force && self.is_active() {
            return;
        }
        self.intensity = intensity;
        self.duration = coerce_duration(duration);
        self.axes = axes;
        self.on_complete = on_complete;
    }

    pub fn is_active(&self) -> bool {
        self.duration > 0.0
    }

    /// Advance the countdown and produce this tick's presentation offset.
    /// Returns `Vec2::ZERO` once the shake has completed.
    pub fn update(&mut self, elapsed: f32, camera_size: Vec2, pixel_perfect: bool) -> Vec2 {
        if self.duration <= 0.0 {
            return Vec2::ZERO;
        }
        self.duration -= elapsed;
        if self.duration <= 0.0 {
            self.duration = 0.0;
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            return Vec2::ZERO;
        }

        let mut rng = rand::thread_rng();
        let mut offset = Vec2::ZERO;
        if self.axes.contains(ShakeAxes::X) {
            offset.x = rng.gen_range(-1.0..=1.0) * self.intensity * camera_size.x;
        }
        if self.axes.contains(ShakeAxes::Y) {
            offset.y = rng.gen_range(-1.0..=1.0) * self.intensity * camera_size.y;
        }
        if pixel_perfect {
            offset = offset.round();
        }
        offset
    }

    /// Stop immediately; the handler does not fire.
    pub fn stop(&mut self) {
        self.duration = 0.0;
        self.on_complete = None;
    }
}

#[cfg(test)]
#[path = "effects_tests.rs"]
mod tests;
