//! Error types for the Prism2D engine
//!
//! This module defines the error types used throughout the engine,
//! including backend submission, initialization, and resource management.

use std::fmt;

/// Result type for Prism2D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Prism2D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (pixel composition, draw-call submission)
    BackendError(String),

    /// Invalid resource (graphic, batch, shader handle)
    InvalidResource(String),

    /// Initialization failed (engine, context, camera)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
