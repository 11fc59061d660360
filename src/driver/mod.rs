//! `BrowserDriver`: a thin capability set over a single automated browser
//! instance, owned by exactly one session.
//!
//! Every method that the spec marks best-effort (`find_and_click`,
//! `screenshot`) returns a plain bool/Option rather than an error — callers
//! above this layer never have to unwrap a transient DOM failure. Methods
//! that can be session-terminal (`open`, `grant_permissions`) return
//! `Result<_, DriverError>` and it is the caller's job to decide whether that
//! is fatal.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::DriverError;

pub mod chromium;
pub mod fake;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaPermission {
    Microphone,
    Camera,
    Notifications,
}

#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A click/text target: either a CSS selector or a free-text predicate
/// matched case-insensitively against visible button/link text, per the
/// shared join pattern's `submit_join` step.
#[derive(Debug, Clone)]
pub enum ClickTarget<'a> {
    Selector(&'a str),
    AnyText(&'a [&'a str]),
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn open(&self, url: &str, timeout: Duration) -> Result<(), DriverError>;

    async fn evaluate(&self, js_source: &str) -> Result<Value, DriverError>;

    /// Returns whether a match was clicked. Never errors on "no match" —
    /// only a broken driver connection is an error.
    async fn find_and_click(&self, target: ClickTarget<'_>) -> Result<bool, DriverError>;

    /// Clicks raw page coordinates — the fallback path for elements whose
    /// click handler is attached to a non-`<button>` wrapper.
    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError>;

    /// Focuses `selector`, selects-all, deletes, then types `text`
    /// character-by-character with >= 40ms inter-key delay. Direct value
    /// assignment is deliberately not offered: frameworks like Teams'
    /// rebuild their state from input events and silently ignore it.
    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError>;

    /// Writes a PNG to `path`. Failure is logged by the caller and treated
    /// as a skipped frame, never a session-terminal error.
    async fn screenshot(&self, path: &Path) -> Result<(), DriverError>;

    async fn grant_permissions(
        &self,
        origin: &str,
        permissions: &[MediaPermission],
    ) -> Result<(), DriverError>;

    async fn keyboard(&self, shortcut: &str) -> Result<(), DriverError>;

    /// Best-effort teardown; safe to call more than once.
    async fn close(&self);
}
