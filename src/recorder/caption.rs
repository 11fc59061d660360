//! Periodic caption scraper. Polls a single page evaluation at 0.5 Hz,
//! filters obvious non-caption noise, and appends only segments whose text
//! differs from the immediately preceding appended segment — an
//! append-only projection, not a set: non-adjacent repeats are legitimate.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::constants::{CAPTION_DEFAULT_CONFIDENCE, CAPTION_MIN_LEN, CAPTION_POLL_INTERVAL_MS};
use crate::model::CaptionSegment;
use crate::session::Session;

#[derive(Debug, Deserialize)]
struct RawCandidate {
    speaker: Option<String>,
    text: String,
}

fn is_noise(candidate: &RawCandidate) -> bool {
    if candidate.text.trim().chars().count() < CAPTION_MIN_LEN {
        return true;
    }
    let lower = candidate.text.to_ascii_lowercase();
    lower.contains("mute") || lower.contains("camera")
}

/// Runs until `session.caption_cancel` fires. `probe_js` must evaluate to a
/// JSON array of `{speaker, text}` objects.
pub async fn run(session: Arc<Session>, probe_js: &str) {
    let mut interval = tokio::time::interval(Duration::from_millis(CAPTION_POLL_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = session.caption_cancel.cancelled() => return,
            _ = interval.tick() => {
                tick(&session, probe_js).await;
            }
        }
    }
}

async fn tick(session: &Arc<Session>, probe_js: &str) {
    let Ok(value) = session.browser.evaluate(probe_js).await else {
        return;
    };
    let Value::Array(items) = value else {
        return;
    };

    for item in items {
        let Ok(candidate) = serde_json::from_value::<RawCandidate>(item) else {
            continue;
        };
        if is_noise(&candidate) {
            continue;
        }
        let elapsed_ms = (Utc::now() - session.started_at).num_milliseconds().max(0);
        session
            .append_caption(CaptionSegment {
                speaker: candidate.speaker.unwrap_or_else(|| "Speaker".to_string()),
                text: candidate.text,
                timestamp_ms_since_session_start: elapsed_ms,
                confidence: CAPTION_DEFAULT_CONFIDENCE,
            })
            .await;
    }
}
