//! Self-hosted headless-browser meeting capture engine.
//!
//! Public entry point: [`CaptureEngine`]. It composes a [`driver::BrowserDriver`],
//! a per-platform [`platform::PlatformAdapter`], the three concurrent
//! recorders, the [`encoder`], and [`registry::SessionRegistry`] persistence
//! into `join`/`leave`/`status`/`screenshot`/`toggle_recording`/`recover_orphan`.

pub mod config;
pub mod constants;
pub mod driver;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod events;
pub mod ffmpeg;
pub mod model;
pub mod paths;
pub mod platform;
pub mod recorder;
pub mod registry;
pub mod session;
pub mod timestamp;

pub use config::EngineConfig;
pub use engine::{BrowserLauncher, CaptureEngine, ChromiumLauncher};
pub use error::{EngineError, Result};
pub use model::{
    CaptionSegment, JoinOptions, JoinResult, LeaveResult, MeetingId, Platform, PersistedSession,
    SessionId, SessionState, StatusResult,
};
