//! Structured error types for the capture engine.
//!
//! Transient, per-operation failures (a stale selector, a missed screenshot) are
//! absorbed at the layer that produced them and never reach these variants. What
//! propagates here is session-scoped and terminal: the caller gets a typed result
//! and the engine is left in a clean state (registry and persistence cleared).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("a live session already exists for meeting {0}")]
    AlreadyActive(String),

    #[error("no active session for meeting {0}")]
    NotActive(String),

    #[error("join timed out waiting for admission")]
    JoinTimedOut,

    #[error("join rejected: {0}")]
    JoinRejected(String),

    #[error("browser driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("audio capture unavailable: {0}")]
    AudioUnavailable(String),

    #[error("encoder failure: {0}")]
    EncoderFailure(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// A single `BrowserDriver` operation failed. Call sites that can tolerate a
/// missed frame or a failed click swallow this and only log it; it is never
/// itself a session-terminal error, only `From`-converted into one at the
/// points where the spec says a driver failure should be.
#[derive(Debug, Error, Clone)]
pub enum DriverError {
    #[error("navigation timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("page evaluation failed: {0}")]
    Evaluate(String),

    #[error("screenshot failed: {0}")]
    Screenshot(String),

    #[error("permission grant failed: {0}")]
    Permission(String),
}
