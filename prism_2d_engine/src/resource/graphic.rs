//! Graphic resources — raw pixel sources for the camera pipeline.
//!
//! A `Graphic` is an opaque handle plus on-demand pixel access: the batching
//! key references it by `GraphicKey`, and the immediate-composition backend
//! samples its pixels. Storage uses a SlotMap so keys are generational:
//! destroying a graphic makes every outstanding key for it resolve to `None`.

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use crate::color::Color;
use crate::error::{Error, Result};

/// Log an invalid-resource condition, then hand back the error value.
fn log_invalid(source: &str, message: String) -> Error {
    crate::engine_error!(source, "{}", message);
    Error::InvalidResource(message)
}

new_key_type! {
    /// Stable, generational key for a Graphic within a GraphicStore.
    ///
    /// A key becomes invalid only when its own graphic is destroyed;
    /// removing other graphics never perturbs it.
    pub struct GraphicKey;
}

/// A pixel source: RGBA8 texels, row-major, packed `0xRRGGBBAA`.
#[derive(Debug, Clone)]
pub struct Graphic {
    name: String,
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Graphic {
    /// Create a graphic from packed pixels.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidResource` if dimensions are zero or the
    /// pixel length does not match `width * height`.
    pub fn new(name: impl Into<String>, width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        let name = name.into();
        if width == 0 || height == 0 {
            return Err(log_invalid(
                "prism2d::Graphic",
                format!("graphic '{}' has zero dimension ({}x{})", name, width, height),
            ));
        }
        if pixels.len() != (width * height) as usize {
            return Err(log_invalid(
                "prism2d::Graphic",
                format!("graphic '{}' pixel length {} != {}x{}", name, pixels.len(), width, height),
            ));
        }
        Ok(Self { name, width, height, pixels })
    }

    /// Create a `width`x`height` graphic filled with one color.
    pub fn solid(name: impl Into<String>, width: u32, height: u32, color: Color) -> Result<Self> {
        let bits = color.to_bits();
        Self::new(name, width, height, vec![bits; (width * height) as usize])
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw packed pixels, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Packed texel at (x, y); out-of-range coordinates read as transparent.
    pub fn texel(&self, x: i32, y: i32) -> u32 {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return 0;
        }
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Central registry of graphics, shared by cameras through the RenderContext.
///
/// Graphics are managed via stable keys (GraphicKey) with a name index for
/// lookup. Keys remain valid even after other graphics are destroyed.
pub struct GraphicStore {
    /// Graphics stored in a slot map for O(1) insert/remove
    graphics: SlotMap<GraphicKey, Graphic>,
    /// Name → key index
    by_name: FxHashMap<String, GraphicKey>,
}

impl GraphicStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            graphics: SlotMap::with_key(),
            by_name: FxHashMap::default(),
        }
    }

    /// Register a graphic, returning its stable key.
    ///
    /// # Errors
    ///
    /// Fails with `Error::InvalidResource` if a graphic with the same name
    /// is already registered.
    pub fn insert(&mut self, graphic: Graphic) -> Result<GraphicKey> {
        if self.by_name.contains_key(graphic.name()) {
            return Err(log_invalid(
                "prism2d::GraphicStore",
                format!("graphic '{}' already registered", graphic.name()),
            ));
        }
        let name = graphic.name().to_string();
        let key = self.graphics.insert(graphic);
        self.by_name.insert(name, key);
        Ok(key)
    }

    /// Resolve a key. Stale keys (destroyed graphics) return `None`.
    pub fn get(&self, key: GraphicKey) -> Option<&Graphic> {
        self.graphics.get(key)
    }

    /// Look up a key by registered name.
    pub fn lookup(&self, name: &str) -> Option<GraphicKey> {
        self.by_name.get(name).copied()
    }

    /// Destroy a graphic. Returns true if the key was live.
    ///
    /// Outstanding keys for the destroyed graphic become stale; batches
    /// still carrying them are skipped at playback.
    pub fn destroy(&mut self, key: GraphicKey) -> bool {
        match self.graphics.remove(key) {
            Some(graphic) => {
                self.by_name.remove(graphic.name());
                true
            }
            None => false,
        }
    }

    /// Number of live graphics.
    pub fn len(&self) -> usize {
        self.graphics.len()
    }

    /// Whether the store holds no graphics.
    pub fn is_empty(&self) -> bool {
        self.graphics.is_empty()
    }
}

impl Default for GraphicStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "graphic_tests.rs"]
mod tests;
