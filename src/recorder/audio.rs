//! Long-lived FFmpeg audio capture. Device selection is OS-dependent;
//! absence of a usable device is logged and never fails the session — the
//! engine falls back to caption-only capture.

use std::ffi::OsString;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use crate::constants::{AUDIO_BITRATE_KBPS, AUDIO_FINALIZE_WAIT_MS, AUDIO_SAMPLE_RATE_HZ, AUDIO_STOP_GRACE_MS};
use crate::session::Session;

fn capture_args(audio_device: Option<&str>) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if cfg!(target_os = "macos") {
        let device_index = audio_device.unwrap_or("0");
        args.push("-f".into());
        args.push("avfoundation".into());
        args.push("-i".into());
        args.push(format!(":{device_index}").into());
    } else {
        args.push("-f".into());
        args.push("pulse".into());
        args.push("-i".into());
        args.push("default".into());
    }
    args.push("-c:a".into());
    args.push("libmp3lame".into());
    args.push("-ac".into());
    args.push("1".into());
    args.push("-ar".into());
    args.push(AUDIO_SAMPLE_RATE_HZ.into());
    args.push("-b:a".into());
    args.push(AUDIO_BITRATE_KBPS.into());
    args.push("-y".into());
    args
}

/// Starts the capture process and stores its handle on the session.
/// Failure is swallowed here — the session proceeds without audio.
pub async fn start(session: &Arc<Session>, audio_device: Option<&str>) {
    let args = capture_args(audio_device);
    let output_path = session.paths.audio_path();
    match session.ffmpeg.spawn_capture(args, output_path).await {
        Ok(handle) => {
            session.recorders.lock().await.audio_capture = Some(handle);
        }
        Err(e) => {
            warn!(error = %e, "audio capture unavailable; continuing caption-only");
        }
    }
}

/// Graceful quit via stdin, then terminate after a grace period, then a
/// bounded wait for the file to finalize. A no-op if audio never started.
pub async fn stop(session: &Arc<Session>) {
    let mut handle = match session.recorders.lock().await.audio_capture.take() {
        Some(h) => h,
        None => return,
    };
    handle.request_quit().await;
    tokio::time::sleep(Duration::from_millis(AUDIO_STOP_GRACE_MS)).await;
    handle.terminate().await;
    let finalized = handle
        .wait(Duration::from_millis(AUDIO_FINALIZE_WAIT_MS))
        .await;
    if !finalized {
        warn!("audio capture did not confirm finalization within the wait window");
    }
}
