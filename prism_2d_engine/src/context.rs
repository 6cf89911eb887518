/// RenderContext - explicit shared state for cameras
///
/// Replaces process-wide statics: the batch-node pool and the graphic store
/// are constructed once here and passed by reference to every camera call
/// that touches them. Unrelated camera sets can use unrelated contexts.

use crate::renderer::BatchPool;
use crate::resource::GraphicStore;

/// Engine defaults carried by a context.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Zoom a camera resolves when constructed with zoom 0
    pub default_zoom: f32,
    /// Size a camera resolves when constructed with non-positive dimensions
    pub default_camera_size: (i32, i32),
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            default_zoom: 1.0,
            default_camera_size: (640, 480),
        }
    }
}

/// Shared context: batch pool, graphic store, defaults.
///
/// Single-threaded by design — the frame model is cooperative and
/// frame-stepped, so the context is passed `&mut` rather than locked.
pub struct RenderContext {
    config: ContextConfig,
    /// Batch-node pool shared by every camera using this context
    pub pool: BatchPool,
    /// Graphic registry shared by every camera using this context
    pub graphics: GraphicStore,
}

impl RenderContext {
    /// Create a context with the given defaults.
    pub fn new(config: ContextConfig) -> Self {
        crate::engine_info!(
            "prism2d::RenderContext",
            "Context created (default zoom {}, default size {}x{})",
            config.default_zoom,
            config.default_camera_size.0,
            config.default_camera_size.1
        );
        Self {
            config,
            pool: BatchPool::new(),
            graphics: GraphicStore::new(),
        }
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
