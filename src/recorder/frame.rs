//! Periodic screenshot producer. Ticks at 2 Hz; a failed screenshot is
//! skipped, never retried within the same tick, and never increments
//! `frame_count` — the Encoder relies on dense, gapless numbering, so a
//! skipped tick must simply not claim an index.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::constants::FRAME_INTERVAL_MS;
use crate::session::Session;

/// Runs until `cancel` fires. The next frame index is always `current
/// frame_count + 1` — dense because a failed write never advances the
/// counter, so the next attempt reuses the same path.
pub async fn run(session: Arc<Session>, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_millis(FRAME_INTERVAL_MS));
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = interval.tick() => {
                let next_index = session.frame_count().await + 1;
                let path = session.paths.frame_path(next_index);
                match session.browser.screenshot(&path).await {
                    Ok(()) => {
                        session.record_frame_success().await;
                    }
                    Err(e) => {
                        debug!(index = next_index, error = %e, "frame screenshot skipped");
                    }
                }
            }
        }
    }
}
