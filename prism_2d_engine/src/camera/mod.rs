//! Camera module — viewport transform, follow controller, effects, and the
//! Camera aggregate itself.
//!
//! A Camera owns its view state, its effect timers, its draw stack and its
//! render backend. The engine does NOT store or manage cameras — they are
//! tools provided by the engine, owned and driven by the caller against a
//! shared `RenderContext`.

mod camera;
mod effects;
mod follow;
mod viewport;

pub use camera::Camera;
pub use effects::ShakeAxes;
pub use follow::{FollowStyle, FollowTarget};
pub use viewport::Viewport;
