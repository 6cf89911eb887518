/// Prism2D Engine - singleton manager for ambient engine state
///
/// This module provides global management for the engine's ambient concerns:
/// the logger and the minimum log severity. Rendering state is deliberately
/// NOT global — the batch pool, graphic store and defaults live in an
/// explicit `RenderContext` owned by the caller and passed by reference.

use std::sync::{OnceLock, RwLock};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

// ===== INTERNAL STATE =====

/// Global engine initialization marker
static ENGINE_STATE: OnceLock<()> = OnceLock::new();

/// Global logger (initialized with DefaultLogger)
static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

/// Minimum severity an entry must have to reach the logger
static LOG_LEVEL: OnceLock<RwLock<LogSeverity>> = OnceLock::new();

// ===== PUBLIC API =====

/// Main engine singleton manager
///
/// Manages the engine's process-wide ambient state (logging). Per-frame
/// rendering state belongs to `RenderContext` and the cameras that use it.
///
/// # Example
///
/// ```no_run
/// use prism_2d_engine::prism2d::{Engine, RenderContext, ContextConfig};
///
/// Engine::initialize()?;
///
/// let mut ctx = RenderContext::new(ContextConfig::default());
/// // create cameras against ctx, run the frame loop...
///
/// Engine::shutdown();
/// # Ok::<(), prism_2d_engine::prism2d::Error>(())
/// ```
pub struct Engine;

impl Engine {
    /// Initialize the engine
    ///
    /// This must be called once at application startup.
    ///
    /// # Errors
    ///
    /// Currently always succeeds, but returns Result for future extensibility.
    pub fn initialize() -> crate::error::Result<()> {
        ENGINE_STATE.get_or_init(|| ());
        crate::engine_info!("prism2d::Engine", "Engine initialized");
        Ok(())
    }

    /// Whether `initialize()` has been called.
    pub fn is_initialized() -> bool {
        ENGINE_STATE.get().is_some()
    }

    /// Shutdown the engine
    ///
    /// Resets the logger to the default and restores the default log level.
    /// Contexts and cameras owned by the caller are unaffected.
    pub fn shutdown() {
        Self::reset_logger();
        Self::set_log_level(LogSeverity::Trace);
        crate::engine_info!("prism2d::Engine", "Engine shut down");
    }

    // ===== LOGGING API =====

    /// Set a custom logger
    ///
    /// Replace the default logger with a custom implementation (file logger,
    /// in-memory capture, etc.)
    ///
    /// # Arguments
    ///
    /// * `logger` - Any type implementing the Logger trait
    ///
    /// # Example
    ///
    /// ```no_run
    /// use prism_2d_engine::prism2d::{Engine, log::{Logger, LogEntry}};
    ///
    /// struct NullLogger;
    /// impl Logger for NullLogger {
    ///     fn log(&self, _entry: &LogEntry) {}
    /// }
    ///
    /// Engine::set_logger(NullLogger);
    /// ```
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(logger);
        }
    }

    /// Reset logger to default (DefaultLogger)
    pub fn reset_logger() {
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(mut lock) = logger_lock.write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Set the minimum severity that reaches the logger
    ///
    /// Entries below `level` are dropped before the logger sees them.
    /// Defaults to `Trace` (everything passes).
    pub fn set_log_level(level: LogSeverity) {
        let level_lock = LOG_LEVEL.get_or_init(|| RwLock::new(LogSeverity::Trace));
        if let Ok(mut lock) = level_lock.write() {
            *lock = level;
        }
    }

    /// Current minimum log severity.
    pub fn log_level() -> LogSeverity {
        let level_lock = LOG_LEVEL.get_or_init(|| RwLock::new(LogSeverity::Trace));
        level_lock.read().map(|lock| *lock).unwrap_or(LogSeverity::Trace)
    }

    /// Internal logging method (for simple logs without file:line)
    ///
    /// Used by macros like engine_info!, engine_warn!, etc.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level
    /// * `source` - Source module (e.g., "prism2d::Camera")
    /// * `message` - Log message
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        if severity < Self::log_level() {
            return;
        }
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: None,
                line: None,
            });
        }
    }

    /// Internal logging method with file:line information (for ERROR logs)
    ///
    /// Used by engine_error! macro to include source location.
    ///
    /// # Arguments
    ///
    /// * `severity` - Log severity level (typically Error)
    /// * `source` - Source module (e.g., "prism2d::Camera")
    /// * `message` - Log message
    /// * `file` - Source file path
    /// * `line` - Source line number
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        if severity < Self::log_level() {
            return;
        }
        let logger_lock = LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)));
        if let Ok(lock) = logger_lock.read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file: Some(file),
                line: Some(line),
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
