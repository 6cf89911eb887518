/*!
# Prism 2D Engine

Core types for the Prism 2D viewport-camera engine.

This crate turns world-space scene content into an ordered sequence of
drawing operations against one of two rendering backends, while maintaining
a follow/deadzone scroll controller and a small set of visual-effect timers
(flash, fade, shake).

## Architecture

- **Camera**: aggregate root — view transform, follow controller, effects,
  draw submission and per-frame playback
- **RenderContext**: explicit shared context — batch-node pool, graphic
  store, engine defaults
- **RenderBackend**: strategy trait with two implementations
  (`ImmediateCompositionBackend`, `BatchedDrawBackend`) chosen per camera
  at construction
- **BatchPool / DrawStack**: pooled, state-keyed draw batching with strict
  insertion-order playback

The engine is single-threaded and frame-stepped: `update(elapsed)` →
draw submission → `render()` → present, once per frame.
*/

// Internal modules
mod error;
mod engine;
mod context;
pub mod log;
pub mod camera;
pub mod color;
pub mod geom;
pub mod renderer;
pub mod resource;

// Main prism2d namespace module
pub mod prism2d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton (logging + lifecycle)
    pub use crate::engine::Engine;

    // Shared render context
    pub use crate::context::{ContextConfig, RenderContext};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Render sub-module with backend types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Geometry/color primitives
    pub mod geom {
        pub use crate::color::{Color, ColorOffset};
        pub use crate::geom::Rect;
    }
}

// Re-export math library at crate root
pub use glam;
