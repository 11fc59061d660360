//! `CaptureEngine`: the public façade. Composes `PlatformAdapter`,
//! `BrowserDriver`, the three recorders, `Encoder`, and
//! `SessionRegistry`/persistence into the six operations external
//! collaborators call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::constants::{DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH, STATUS_TRANSCRIPT_TAIL};
use crate::driver::{BrowserDriver, MediaPermission, Viewport};
use crate::encoder::{self, EncodeRequest};
use crate::error::{EngineError, Result};
use crate::events::{EventBus, SessionEvent};
use crate::ffmpeg::FfmpegClient;
use crate::model::{
    CaptionSegment, JoinOptions, JoinResult, LeaveResult, MeetingId, Platform, PersistedSession,
    StatusResult, TranscriptSnapshotEntry,
};
use crate::paths::SessionPaths;
use crate::platform::{self, JoinOutcome, PlatformAdapter};
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::timestamp::format_hms;

#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, viewport: Viewport) -> Result<Arc<dyn BrowserDriver>>;
}

pub struct ChromiumLauncher;

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, viewport: Viewport) -> Result<Arc<dyn BrowserDriver>> {
        let driver = crate::driver::chromium::ChromiumDriver::launch(viewport)
            .await
            .map_err(EngineError::from)?;
        Ok(Arc::new(driver))
    }
}

pub struct CaptureEngine {
    config: EngineConfig,
    registry: SessionRegistry,
    launcher: Arc<dyn BrowserLauncher>,
    ffmpeg: Arc<dyn FfmpegClient>,
    events: EventBus,
}

/// Best-effort scheme+host extraction for `grant_permissions`'s origin
/// argument; meeting URLs are always absolute, so a missing `://` just
/// falls back to the whole string.
fn origin_of(url: &str) -> String {
    let Some(scheme_end) = url.find("://") else {
        return url.to_string();
    };
    let after_scheme = &url[scheme_end + 3..];
    let host_end = after_scheme.find('/').unwrap_or(after_scheme.len());
    url[..scheme_end + 3 + host_end].to_string()
}

impl CaptureEngine {
    pub fn new(config: EngineConfig, launcher: Arc<dyn BrowserLauncher>, ffmpeg: Arc<dyn FfmpegClient>) -> Result<Self> {
        config.ensure_recordings_root()?;
        Ok(Self {
            registry: SessionRegistry::load(config.recordings_root.clone()),
            config,
            launcher,
            ffmpeg,
            events: EventBus::new(),
        })
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub async fn join(
        &self,
        meeting_id: MeetingId,
        meeting_url: &str,
        options: JoinOptions,
    ) -> Result<JoinResult> {
        if self.registry.get(&meeting_id).await.is_some() {
            return Err(EngineError::AlreadyActive(meeting_id));
        }

        let platform = Platform::detect(meeting_url);
        let session_id = Uuid::new_v4().to_string();
        let paths = SessionPaths::new(self.config.recordings_root.clone(), session_id.clone());
        std::fs::create_dir_all(paths.frames_dir())?;

        let viewport = Viewport {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        };
        let browser = self.launcher.launch(viewport).await?;
        if let Err(e) = browser
            .grant_permissions(
                &origin_of(meeting_url),
                &[
                    MediaPermission::Microphone,
                    MediaPermission::Camera,
                    MediaPermission::Notifications,
                ],
            )
            .await
        {
            warn!(error = %e, "permission pre-grant failed; proceeding, admission may stall");
        }

        let started_at = Utc::now();
        let session = Arc::new(Session::new(
            meeting_id.clone(),
            session_id.clone(),
            platform,
            started_at,
            paths.clone(),
            browser.clone(),
            self.ffmpeg.clone(),
        ));

        let record = PersistedSession {
            meeting_id: meeting_id.clone(),
            session_id: session_id.clone(),
            platform,
            frames_dir: paths.frames_dir(),
            started_at,
            frame_count: 0,
        };
        self.registry.insert_unique(session.clone(), record).await?;

        let bot_name = options
            .bot_name
            .unwrap_or_else(|| self.config.default_bot_name.clone());
        let adapter = platform::adapter_for(platform);
        let events = self.events.clone();
        let waiting_meeting_id = meeting_id.clone();
        let on_waiting = move || {
            events.publish(SessionEvent::WaitingInLobby {
                meeting_id: waiting_meeting_id.clone(),
            });
        };
        let outcome = adapter
            .join(browser.as_ref(), meeting_url, &bot_name, &on_waiting)
            .await;

        match outcome {
            JoinOutcome::Succeeded => {
                adapter.enable_captions(browser.as_ref()).await;
                session.set_state(crate::model::SessionState::InMeeting).await;
                self.events.publish(SessionEvent::InMeeting {
                    meeting_id: meeting_id.clone(),
                    platform,
                });
                self.start_recording(&session).await;
                Ok(JoinResult {
                    success: true,
                    session_id: Some(session_id),
                    platform: Some(platform),
                    recording_started: true,
                    error: None,
                })
            }
            JoinOutcome::TimedOut => {
                self.teardown_failed_join(&session, &meeting_id).await;
                Ok(JoinResult {
                    success: false,
                    session_id: None,
                    platform: Some(platform),
                    recording_started: false,
                    error: Some("JoinTimedOut".to_string()),
                })
            }
            JoinOutcome::Rejected(reason) => {
                self.teardown_failed_join(&session, &meeting_id).await;
                self.events.publish(SessionEvent::JoinFailed {
                    meeting_id: meeting_id.clone(),
                    reason: reason.clone(),
                });
                Ok(JoinResult {
                    success: false,
                    session_id: None,
                    platform: Some(platform),
                    recording_started: false,
                    error: Some(reason),
                })
            }
        }
    }

    async fn teardown_failed_join(&self, session: &Arc<Session>, meeting_id: &str) {
        session.browser.close().await;
        self.registry.remove(meeting_id).await;
    }

    async fn start_recording(&self, session: &Arc<Session>) {
        session.set_state(crate::model::SessionState::Recording).await;
        {
            let mut shared = session.shared.lock().await;
            shared.is_recording = true;
        }

        let frame_cancel = session.new_frame_cancel().await;
        let frame_session = session.clone();
        let frame_task =
            tokio::spawn(async move { crate::recorder::frame::run(frame_session, frame_cancel).await });

        crate::recorder::audio::start(session, self.config.audio_device.as_deref()).await;

        let caption_session = session.clone();
        let probe_js = caption_probe_js(session.platform);
        let caption_task =
            tokio::spawn(async move { crate::recorder::caption::run(caption_session, probe_js).await });

        let mut recorders = session.recorders.lock().await;
        recorders.frame_task = Some(frame_task);
        recorders.caption_task = Some(caption_task);

        self.events.publish(SessionEvent::RecordingStarted {
            meeting_id: session.meeting_id.clone(),
        });
    }

    pub async fn leave(&self, meeting_id: &str) -> Result<LeaveResult> {
        let session = match self.registry.get(meeting_id).await {
            Some(s) => s,
            None => {
                if let Some(orphan) = self.registry.take_orphan(meeting_id).await {
                    return self.recover_orphan(orphan).await;
                }
                return Err(EngineError::NotActive(meeting_id.to_string()));
            }
        };

        session.set_state(crate::model::SessionState::Ending).await;
        session.caption_cancel.cancel();

        let final_screenshot_path = session.paths.screenshot_path(epoch_ms());
        if session
            .browser
            .screenshot(&final_screenshot_path)
            .await
            .is_ok()
        {
            session.push_screenshot(final_screenshot_path).await;
        }

        session.cancel_frame_loop().await;
        crate::recorder::audio::stop(&session).await;
        session.browser.close().await;

        let (transcript_text, transcript_segments, frame_count, screenshots) = {
            let shared = session.shared.lock().await;
            (
                render_transcript(&shared.transcript),
                shared.transcript.clone(),
                shared.frame_count,
                shared.screenshots.clone(),
            )
        };

        let video_path = if frame_count >= 1 {
            let audio_path = session.paths.audio_path();
            let audio_path = audio_path.exists().then_some(audio_path);
            match encoder::encode(
                &self.ffmpeg,
                EncodeRequest {
                    frames_dir: session.paths.frames_dir(),
                    audio_path,
                    video_path: session.paths.video_path(),
                    framerate: 2,
                },
            )
            .await
            {
                Ok(path) => path,
                Err(e) => {
                    warn!(error = %e, "encoder failed; frames preserved for recovery");
                    None
                }
            }
        } else {
            None
        };

        let duration_seconds = (Utc::now() - session.started_at).num_seconds();
        session.set_state(crate::model::SessionState::Ended).await;
        self.registry.remove(meeting_id).await;
        self.events.publish(SessionEvent::Ended {
            meeting_id: meeting_id.to_string(),
        });

        Ok(LeaveResult {
            success: true,
            duration_seconds,
            transcript: transcript_text,
            transcript_segments,
            video_path,
            screenshots,
            frame_count,
        })
    }

    pub async fn status(&self, meeting_id: &str) -> StatusResult {
        let Some(session) = self.registry.get(meeting_id).await else {
            return StatusResult::NotActive;
        };
        let shared = session.shared.lock().await;
        let recent_transcript = shared
            .transcript
            .iter()
            .rev()
            .take(STATUS_TRANSCRIPT_TAIL)
            .map(to_snapshot_entry)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        StatusResult::Active {
            session_id: session.session_id.clone(),
            platform: session.platform,
            state: shared.state,
            is_recording: shared.is_recording,
            frame_count: shared.frame_count,
            screenshot_count: shared.screenshots.len(),
            recent_transcript,
        }
    }

    pub async fn screenshot(&self, meeting_id: &str) -> Result<std::path::PathBuf> {
        let session = self
            .registry
            .get(meeting_id)
            .await
            .ok_or_else(|| EngineError::NotActive(meeting_id.to_string()))?;
        let path = session.paths.screenshot_path(epoch_ms());
        session
            .browser
            .screenshot(&path)
            .await
            .map_err(EngineError::from)?;
        session.push_screenshot(path.clone()).await;
        Ok(path)
    }

    pub async fn toggle_recording(&self, meeting_id: &str) -> Result<bool> {
        let session = self
            .registry
            .get(meeting_id)
            .await
            .ok_or_else(|| EngineError::NotActive(meeting_id.to_string()))?;

        let now_recording = {
            let mut shared = session.shared.lock().await;
            shared.is_recording = !shared.is_recording;
            shared.is_recording
        };

        if now_recording {
            session.set_state(crate::model::SessionState::Recording).await;

            let frame_cancel = session.new_frame_cancel().await;
            let frame_session = session.clone();
            let frame_task = tokio::spawn(async move {
                crate::recorder::frame::run(frame_session, frame_cancel).await
            });
            crate::recorder::audio::start(&session, self.config.audio_device.as_deref()).await;
            session.recorders.lock().await.frame_task = Some(frame_task);

            self.events.publish(SessionEvent::RecordingResumed {
                meeting_id: meeting_id.to_string(),
            });
        } else {
            session.cancel_frame_loop().await;
            crate::recorder::audio::stop(&session).await;
            session.set_state(crate::model::SessionState::Paused).await;

            self.events.publish(SessionEvent::RecordingPaused {
                meeting_id: meeting_id.to_string(),
            });
        }

        Ok(now_recording)
    }

    pub async fn recover_orphan(&self, persisted: PersistedSession) -> Result<LeaveResult> {
        let frame_count = std::fs::read_dir(&persisted.frames_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter(|e| {
                        e.path()
                            .extension()
                            .map(|ext| ext == "png")
                            .unwrap_or(false)
                    })
                    .count() as u64
            })
            .unwrap_or(0);

        if frame_count == 0 {
            self.registry
                .remove_persisted_only(&persisted.meeting_id)
                .await;
            return Err(EngineError::NotActive(persisted.meeting_id));
        }

        let paths = SessionPaths::new(
            self.config.recordings_root.clone(),
            persisted.session_id.clone(),
        );
        let video_path = encoder::encode(
            &self.ffmpeg,
            EncodeRequest {
                frames_dir: persisted.frames_dir.clone(),
                audio_path: None,
                video_path: paths.video_path(),
                framerate: 2,
            },
        )
        .await
        .unwrap_or(None);

        let duration_seconds = (frame_count / 2) as i64;
        self.registry
            .remove_persisted_only(&persisted.meeting_id)
            .await;

        info!(meeting_id = %persisted.meeting_id, frame_count, "recovered orphaned session");

        Ok(LeaveResult {
            success: video_path.is_some(),
            duration_seconds,
            transcript: crate::constants::RECOVERY_TRANSCRIPT.to_string(),
            transcript_segments: Vec::new(),
            video_path,
            screenshots: Vec::new(),
            frame_count,
        })
    }

    /// Cancels every live session's frame and caption timers synchronously,
    /// without running the Encoder or touching persistence — the process is
    /// going down, not any one meeting ending. A subsequent process start
    /// recovers these sessions through `recover_orphan`.
    pub async fn shutdown(&self) {
        for session in self.registry.all_sessions().await {
            session.caption_cancel.cancel();
            session.cancel_frame_loop().await;
        }
    }
}

fn caption_probe_js(platform: Platform) -> &'static str {
    match platform {
        Platform::Zoom => {
            "Array.from(document.querySelectorAll('.closed-caption-item, [class*=caption]')).map(n => ({speaker: null, text: n.textContent || ''}))"
        }
        Platform::GoogleMeet => {
            "Array.from(document.querySelectorAll('[jsname] [class*=caption], div[aria-live] span')).map(n => ({speaker: null, text: n.textContent || ''}))"
        }
        Platform::Teams => {
            "Array.from(document.querySelectorAll('[data-tid=closed-caption-text]')).map(n => ({speaker: null, text: n.textContent || ''}))"
        }
        Platform::Webex => {
            "Array.from(document.querySelectorAll('[class*=caption-text]')).map(n => ({speaker: null, text: n.textContent || ''}))"
        }
        Platform::Unknown => "[]",
    }
}

fn render_transcript(segments: &[CaptionSegment]) -> String {
    if segments.is_empty() {
        return crate::constants::EMPTY_TRANSCRIPT.to_string();
    }
    let mut ordered = segments.to_vec();
    ordered.sort_by_key(|s| s.timestamp_ms_since_session_start);
    ordered
        .iter()
        .map(|s| {
            format!(
                "[{}] {}: {}",
                format_hms(s.timestamp_ms_since_session_start),
                s.speaker,
                s.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn to_snapshot_entry(segment: &CaptionSegment) -> TranscriptSnapshotEntry {
    TranscriptSnapshotEntry {
        speaker: segment.speaker.clone(),
        text: segment.text.clone(),
        timestamp: format_hms(segment.timestamp_ms_since_session_start),
    }
}

fn epoch_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_of_strips_path_and_query() {
        assert_eq!(
            origin_of("https://meet.google.com/abc-defg-hij"),
            "https://meet.google.com"
        );
        assert_eq!(origin_of("https://zoom.us/j/123?pwd=x"), "https://zoom.us");
    }

    #[test]
    fn render_transcript_falls_back_when_empty() {
        assert_eq!(render_transcript(&[]), crate::constants::EMPTY_TRANSCRIPT);
    }

    #[test]
    fn render_transcript_sorts_and_formats_lines() {
        let segments = vec![
            CaptionSegment {
                speaker: "B".to_string(),
                text: "second".to_string(),
                timestamp_ms_since_session_start: 2000,
                confidence: 0.95,
            },
            CaptionSegment {
                speaker: "A".to_string(),
                text: "first".to_string(),
                timestamp_ms_since_session_start: 1000,
                confidence: 0.95,
            },
        ];
        let text = render_transcript(&segments);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[00:00:01] A: first");
        assert_eq!(lines[1], "[00:00:02] B: second");
    }
}
