//! Resource module - graphic resources used as batching keys
//!
//! Graphics are registered in a `GraphicStore` and addressed by generational
//! `GraphicKey`s. A destroyed graphic invalidates its key; batches carrying a
//! stale key are skipped at playback instead of crashing.

mod graphic;

pub use graphic::{Graphic, GraphicKey, GraphicStore};
