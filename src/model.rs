//! Shared data types: identifiers, the platform enumeration, the session
//! state machine, caption segments, and the on-disk persistence record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub type MeetingId = String;
pub type SessionId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Zoom,
    GoogleMeet,
    Teams,
    Webex,
    Unknown,
}

impl Platform {
    /// A deterministic, I/O-free classifier of a meeting URL. First matching
    /// substring rule wins; anything unrecognized is `Unknown`.
    pub fn detect(url: &str) -> Platform {
        let lower = url.to_ascii_lowercase();
        if lower.contains("zoom.us") || lower.contains("zoom.com") {
            Platform::Zoom
        } else if lower.contains("meet.google.com") {
            Platform::GoogleMeet
        } else if lower.contains("teams.microsoft.com") || lower.contains("teams.live.com") {
            Platform::Teams
        } else if lower.contains("webex.com") {
            Platform::Webex
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Zoom => "zoom",
            Platform::GoogleMeet => "google_meet",
            Platform::Teams => "teams",
            Platform::Webex => "webex",
            Platform::Unknown => "unknown",
        }
    }
}

/// The single-session state machine. `joining -> in_meeting -> recording`,
/// with `recording <-> paused` toggles, any-state `-> ending -> ended`, and a
/// terminal `errored` reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Joining,
    InMeeting,
    Recording,
    Paused,
    Ending,
    Ended,
    Errored,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionSegment {
    pub speaker: String,
    pub text: String,
    pub timestamp_ms_since_session_start: i64,
    pub confidence: f32,
}

/// On-disk recovery record. Intentionally a strict subset of `Session`: the
/// filesystem, not this record, is the source of truth for frame count and
/// transcript content after a crash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSession {
    pub meeting_id: MeetingId,
    pub session_id: SessionId,
    pub platform: Platform,
    pub frames_dir: PathBuf,
    pub started_at: DateTime<Utc>,
    pub frame_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JoinOptions {
    pub bot_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResult {
    pub success: bool,
    pub session_id: Option<SessionId>,
    pub platform: Option<Platform>,
    pub recording_started: bool,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveResult {
    pub success: bool,
    pub duration_seconds: i64,
    pub transcript: String,
    pub transcript_segments: Vec<CaptionSegment>,
    pub video_path: Option<PathBuf>,
    pub screenshots: Vec<PathBuf>,
    pub frame_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSnapshotEntry {
    pub speaker: String,
    pub text: String,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusResult {
    NotActive,
    Active {
        session_id: SessionId,
        platform: Platform,
        state: SessionState,
        is_recording: bool,
        frame_count: u64,
        screenshot_count: usize,
        recent_transcript: Vec<TranscriptSnapshotEntry>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_pure_and_order_independent_of_case() {
        assert_eq!(Platform::detect("https://ZOOM.US/j/123"), Platform::Zoom);
        assert_eq!(
            Platform::detect("https://meet.google.com/abc-defg-hij"),
            Platform::GoogleMeet
        );
        assert_eq!(
            Platform::detect("https://teams.live.com/meet/1"),
            Platform::Teams
        );
        assert_eq!(
            Platform::detect("https://teams.microsoft.com/l/meetup-join/1"),
            Platform::Teams
        );
        assert_eq!(
            Platform::detect("https://company.webex.com/meet/room"),
            Platform::Webex
        );
        assert_eq!(Platform::detect("https://example.com"), Platform::Unknown);
    }

    #[test]
    fn detect_is_deterministic() {
        let url = "https://zoom.us/j/123456789";
        for _ in 0..5 {
            assert_eq!(Platform::detect(url), Platform::Zoom);
        }
    }
}
