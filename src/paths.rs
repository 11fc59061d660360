//! Centralized path management for session artifacts.
//!
//! Single source of truth for every filename the spec fixes: frames
//! directory, video, audio, screenshots, and the `active_sessions.json`
//! persistence file.

use std::path::{Path, PathBuf};

use crate::constants::FRAME_INDEX_WIDTH;

#[derive(Debug, Clone)]
pub struct SessionPaths {
    root: PathBuf,
    session_id: String,
}

impl SessionPaths {
    pub fn new(root: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            session_id: session_id.into(),
        }
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.root.join(format!("{}_frames", self.session_id))
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.frames_dir().join(format!(
            "frame_{:0width$}.png",
            index,
            width = FRAME_INDEX_WIDTH
        ))
    }

    pub fn audio_path(&self) -> PathBuf {
        self.root.join(format!("{}_audio.mp3", self.session_id))
    }

    pub fn video_path(&self) -> PathBuf {
        self.root.join(format!("{}_video.mp4", self.session_id))
    }

    pub fn screenshot_path(&self, epoch_ms: u64) -> PathBuf {
        self.root
            .join(format!("{}_screenshot_{}.png", self.session_id, epoch_ms))
    }

}

pub fn active_sessions_file(root: &Path) -> PathBuf {
    root.join("active_sessions.json")
}
