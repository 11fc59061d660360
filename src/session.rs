//! The live, in-memory `Session`: single owner of a browser, an optional
//! audio subprocess, and the three recorder tasks, per the concurrency
//! model's "owned by its creating task" rule. Mutable fields are grouped
//! behind one per-session mutex; `Status` readers take the same lock and
//! copy out rather than holding a reference.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::driver::BrowserDriver;
use crate::ffmpeg::{FfmpegCaptureHandle, FfmpegClient};
use crate::model::{CaptionSegment, MeetingId, Platform, SessionId, SessionState};
use crate::paths::SessionPaths;

pub struct SessionMutable {
    pub state: SessionState,
    pub frame_count: u64,
    pub transcript: Vec<CaptionSegment>,
    pub screenshots: Vec<PathBuf>,
    pub is_recording: bool,
}

/// Handles to the three recorder tasks, so `ToggleRecording`/`Leave` can
/// stop exactly the ones currently running without guessing at state.
#[derive(Default)]
pub struct RecorderHandles {
    pub frame_task: Option<JoinHandle<()>>,
    /// Recreated each time frame capture (re)starts, so a paused-then-
    /// resumed recorder is never handed an already-cancelled token.
    pub frame_cancel: Option<CancellationToken>,
    pub caption_task: Option<JoinHandle<()>>,
    pub audio_capture: Option<Box<dyn FfmpegCaptureHandle>>,
}

pub struct Session {
    pub meeting_id: MeetingId,
    pub session_id: SessionId,
    pub platform: Platform,
    pub started_at: DateTime<Utc>,
    pub paths: SessionPaths,
    pub browser: Arc<dyn BrowserDriver>,
    pub ffmpeg: Arc<dyn FfmpegClient>,
    pub shared: Mutex<SessionMutable>,
    pub recorders: Mutex<RecorderHandles>,
    /// Cancels the caption polling loop exactly once, at `Leave` — caption
    /// scraping is never toggled by `ToggleRecording`, so unlike the frame
    /// loop's token it never needs recreating.
    pub caption_cancel: CancellationToken,
}

impl Session {
    pub fn new(
        meeting_id: MeetingId,
        session_id: SessionId,
        platform: Platform,
        started_at: DateTime<Utc>,
        paths: SessionPaths,
        browser: Arc<dyn BrowserDriver>,
        ffmpeg: Arc<dyn FfmpegClient>,
    ) -> Self {
        Self {
            meeting_id,
            session_id,
            platform,
            started_at,
            paths,
            browser,
            ffmpeg,
            shared: Mutex::new(SessionMutable {
                state: SessionState::Joining,
                frame_count: 0,
                transcript: Vec::new(),
                screenshots: Vec::new(),
                is_recording: false,
            }),
            recorders: Mutex::new(RecorderHandles::default()),
            caption_cancel: CancellationToken::new(),
        }
    }

    /// Installs a fresh cancellation token for the frame loop and returns a
    /// clone for the spawned task to watch.
    pub async fn new_frame_cancel(&self) -> CancellationToken {
        let token = CancellationToken::new();
        self.recorders.lock().await.frame_cancel = Some(token.clone());
        token
    }

    /// Cancels the current frame loop, if one is running.
    pub async fn cancel_frame_loop(&self) {
        if let Some(token) = self.recorders.lock().await.frame_cancel.take() {
            token.cancel();
        }
    }

    pub async fn set_state(&self, state: SessionState) {
        self.shared.lock().await.state = state;
    }

    pub async fn state(&self) -> SessionState {
        self.shared.lock().await.state
    }

    /// Appends `segment` unless its text duplicates the immediately
    /// preceding one — the dedup contract is against the previous append
    /// only, not the whole transcript.
    pub async fn append_caption(&self, segment: CaptionSegment) {
        let mut shared = self.shared.lock().await;
        if shared
            .transcript
            .last()
            .map(|prev| prev.text == segment.text)
            .unwrap_or(false)
        {
            return;
        }
        shared.transcript.push(segment);
    }

    pub async fn record_frame_success(&self) -> u64 {
        let mut shared = self.shared.lock().await;
        shared.frame_count += 1;
        shared.frame_count
    }

    pub async fn frame_count(&self) -> u64 {
        self.shared.lock().await.frame_count
    }

    pub async fn push_screenshot(&self, path: PathBuf) {
        self.shared.lock().await.screenshots.push(path);
    }
}
