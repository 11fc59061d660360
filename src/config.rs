//! Engine-wide configuration, sourced from the process environment.
//!
//! The spec lists these as "abstract names — implementers map to any source";
//! environment variables are the simplest faithful mapping and match how the
//! FFmpeg binary path and bot identity are resolved elsewhere in this crate.

use std::path::PathBuf;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// OS-specific audio source identifier (e.g. a pulse source name, or an
    /// avfoundation device index on macOS).
    pub audio_device: Option<String>,
    /// Opaque token passed through to an out-of-scope transcription
    /// collaborator. Absence disables that (unimplemented here) path.
    pub openai_api_key: Option<String>,
    /// Display name used when joining a meeting.
    pub default_bot_name: String,
    /// Filesystem root for all session artifacts.
    pub recordings_root: PathBuf,
    /// Path to the ffmpeg binary.
    pub ffmpeg_path: PathBuf,
}

impl EngineConfig {
    pub const DEFAULT_BOT_NAME: &'static str = "Meeting Notetaker";

    pub fn from_env() -> Self {
        Self {
            audio_device: std::env::var("MEETING_CAPTURE_AUDIO_DEVICE").ok(),
            openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            default_bot_name: std::env::var("MEETING_CAPTURE_BOT_NAME")
                .unwrap_or_else(|_| Self::DEFAULT_BOT_NAME.to_string()),
            recordings_root: std::env::var("MEETING_CAPTURE_RECORDINGS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("recordings")),
            ffmpeg_path: std::env::var("MEETING_CAPTURE_FFMPEG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("ffmpeg")),
        }
    }

    /// Ensures the recordings root exists and is writable. `Join`/`Leave`
    /// never reach the filesystem if this fails first — `ConfigurationError`
    /// is fatal and surfaced immediately.
    pub fn ensure_recordings_root(&self) -> Result<()> {
        std::fs::create_dir_all(&self.recordings_root).map_err(|e| {
            EngineError::Configuration(format!(
                "recordings root {} is not writable: {e}",
                self.recordings_root.display()
            ))
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bot_name_is_stable() {
        let cfg = EngineConfig {
            audio_device: None,
            openai_api_key: None,
            default_bot_name: EngineConfig::DEFAULT_BOT_NAME.to_string(),
            recordings_root: PathBuf::from("recordings"),
            ffmpeg_path: PathBuf::from("ffmpeg"),
        };
        assert_eq!(cfg.default_bot_name, "Meeting Notetaker");
    }
}
