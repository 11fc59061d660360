//! End-to-end capture scenarios driven entirely by a fake browser and a
//! fake FFmpeg — no real Chrome process and no subprocess ever spawned.

use std::sync::Arc;
use std::time::Duration;

use meeting_capture_engine::config::EngineConfig;
use meeting_capture_engine::constants::{EMPTY_TRANSCRIPT, RECOVERY_TRANSCRIPT};
use meeting_capture_engine::driver::fake::{FakeBrowserDriver, FakeBrowserDriverScript};
use meeting_capture_engine::engine::CaptureEngine;
use meeting_capture_engine::error::EngineError;
use meeting_capture_engine::ffmpeg::fake::{FakeFfmpeg, FakeFfmpegScript};
use meeting_capture_engine::model::{JoinOptions, Platform, StatusResult};

mod common;
use common::fixtures::{caption_dedup_sequence, join_success_script, join_timeout_script};
use common::mocks::FixedLauncher;

fn test_config(root: std::path::PathBuf) -> EngineConfig {
    EngineConfig {
        audio_device: None,
        openai_api_key: None,
        default_bot_name: "Meeting Notetaker".to_string(),
        recordings_root: root,
        ffmpeg_path: "ffmpeg".into(),
    }
}

async fn frame_count(engine: &CaptureEngine, meeting_id: &str) -> u64 {
    match engine.status(meeting_id).await {
        StatusResult::Active { frame_count, .. } => frame_count,
        StatusResult::NotActive => 0,
    }
}

/// S1 — happy path, Google Meet: one tick of waiting room, then admission,
/// a few seconds of frame capture, then a clean leave.
#[tokio::test]
async fn s1_happy_path_google_meet() {
    let (_dir, root) = common::create_test_dir();
    let driver = Arc::new(FakeBrowserDriver::new(join_success_script(1)));
    let engine = CaptureEngine::new(
        test_config(root.clone()),
        Arc::new(FixedLauncher::new(driver)),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    let join = engine
        .join(
            "M1".to_string(),
            "https://meet.google.com/abc-defg-hij",
            JoinOptions::default(),
        )
        .await
        .unwrap();
    assert!(join.success);
    assert_eq!(join.platform, Some(Platform::GoogleMeet));
    assert!(join.recording_started);

    tokio::time::sleep(Duration::from_millis(3200)).await;
    assert!(frame_count(&engine, "M1").await >= 2);

    let leave = engine.leave("M1").await.unwrap();
    assert!(leave.duration_seconds >= 1);
    assert!(leave
        .video_path
        .expect("at least one frame should encode a video")
        .to_string_lossy()
        .ends_with("_video.mp4"));
    assert_eq!(leave.transcript, EMPTY_TRANSCRIPT);

    let persisted = std::fs::read_to_string(root.join("active_sessions.json")).unwrap();
    assert!(!persisted.contains("\"M1\""));
}

/// S2 — lobby timeout, Zoom: the URL is rewritten to the web-client join
/// path before the (120-tick) admission poll even starts, so the rewrite can
/// be observed without waiting for the real timeout to elapse.
#[tokio::test]
async fn s2_zoom_join_rewrites_url_before_polling_admission() {
    let (_dir, root) = common::create_test_dir();
    let driver = Arc::new(FakeBrowserDriver::new(join_timeout_script()));
    let engine = CaptureEngine::new(
        test_config(root),
        Arc::new(FixedLauncher::new(driver.clone())),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    let _ = tokio::time::timeout(
        Duration::from_millis(200),
        engine.join(
            "M2".to_string(),
            "https://zoom.us/j/123456789",
            JoinOptions::default(),
        ),
    )
    .await;

    let opened = driver.opened_urls();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0], "https://zoom.us/wc/123456789/join");
}

/// S3 — duplicate join is rejected and the original session stays active.
#[tokio::test]
async fn s3_duplicate_join_is_rejected() {
    let (_dir, root) = common::create_test_dir();
    let driver = Arc::new(FakeBrowserDriver::new(join_success_script(0)));
    let engine = CaptureEngine::new(
        test_config(root),
        Arc::new(FixedLauncher::new(driver)),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    let first = engine
        .join(
            "M3".to_string(),
            "https://meet.google.com/abc",
            JoinOptions::default(),
        )
        .await
        .unwrap();
    assert!(first.success);

    let second = engine
        .join(
            "M3".to_string(),
            "https://meet.google.com/abc",
            JoinOptions::default(),
        )
        .await;
    assert!(matches!(second, Err(EngineError::AlreadyActive(_))));

    assert!(matches!(
        engine.status("M3").await,
        StatusResult::Active { .. }
    ));

    engine.leave("M3").await.unwrap();
}

/// S4 — pause/resume: `ToggleRecording` halts the frame loop and later
/// restarts it from a fresh cancellation token rather than a stale one.
#[tokio::test]
async fn s4_pause_resume_halts_and_resumes_frame_capture() {
    let (_dir, root) = common::create_test_dir();
    let driver = Arc::new(FakeBrowserDriver::new(join_success_script(0)));
    let engine = CaptureEngine::new(
        test_config(root),
        Arc::new(FixedLauncher::new(driver)),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    engine
        .join(
            "M4".to_string(),
            "https://meet.google.com/abc",
            JoinOptions::default(),
        )
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(frame_count(&engine, "M4").await >= 1);

    let is_recording = engine.toggle_recording("M4").await.unwrap();
    assert!(!is_recording);

    let count_while_paused = frame_count(&engine, "M4").await;
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(frame_count(&engine, "M4").await, count_while_paused);

    let resumed = engine.toggle_recording("M4").await.unwrap();
    assert!(resumed);
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert!(frame_count(&engine, "M4").await > count_while_paused);

    let leave = engine.leave("M4").await.unwrap();
    assert!(leave.frame_count >= count_while_paused);
}

/// S5 — caption dedup: hello, hello, world, hello -> hello, world, hello.
#[tokio::test]
async fn s5_caption_dedup_keeps_non_adjacent_repeats() {
    let (_dir, root) = common::create_test_dir();
    let script = FakeBrowserDriverScript {
        caption_queue: caption_dedup_sequence(),
        ..join_success_script(0)
    };
    let driver = Arc::new(FakeBrowserDriver::new(script));
    let engine = CaptureEngine::new(
        test_config(root),
        Arc::new(FixedLauncher::new(driver)),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    engine
        .join(
            "M5".to_string(),
            "https://meet.google.com/abc",
            JoinOptions::default(),
        )
        .await
        .unwrap();

    // Caption polling ticks every 2s; wait past the 4th tick.
    tokio::time::sleep(Duration::from_millis(8700)).await;
    let leave = engine.leave("M5").await.unwrap();

    let texts: Vec<&str> = leave
        .transcript_segments
        .iter()
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(texts, vec!["hello", "world", "hello"]);
}

/// S6 — crash recovery: a persisted session with frames on disk and no live
/// `Session` recovers through `Leave`, which falls through to
/// `recover_orphan` and encodes a video-only artifact.
#[tokio::test]
async fn s6_crash_recovery_encodes_video_only() {
    let (_dir, root) = common::create_test_dir();
    let frames_dir = root.join("S6_frames");
    std::fs::create_dir_all(&frames_dir).unwrap();
    for i in 1..=20u32 {
        std::fs::write(frames_dir.join(format!("frame_{i:06}.png")), b"x").unwrap();
    }

    let persisted_map = serde_json::json!({
        "M6": {
            "meeting_id": "M6",
            "session_id": "S6",
            "platform": "teams",
            "frames_dir": frames_dir,
            "started_at": "2024-01-01T00:00:00Z",
            "frame_count": 0
        }
    });
    std::fs::write(
        root.join("active_sessions.json"),
        serde_json::to_vec_pretty(&persisted_map).unwrap(),
    )
    .unwrap();

    let driver = Arc::new(FakeBrowserDriver::new(FakeBrowserDriverScript::default()));
    let engine = CaptureEngine::new(
        test_config(root.clone()),
        Arc::new(FixedLauncher::new(driver)),
        Arc::new(FakeFfmpeg::new(FakeFfmpegScript::default())),
    )
    .unwrap();

    let leave = engine.leave("M6").await.unwrap();
    assert_eq!(leave.duration_seconds, 10);
    assert_eq!(leave.transcript, RECOVERY_TRANSCRIPT);
    assert!(leave.video_path.unwrap().exists());

    let persisted = std::fs::read_to_string(root.join("active_sessions.json")).unwrap();
    assert!(!persisted.contains("\"M6\""));

    // A second `Leave` on the same (now fully cleaned up) meeting id finds
    // neither a live session nor a persisted orphan.
    assert!(matches!(
        engine.leave("M6").await,
        Err(EngineError::NotActive(_))
    ));
}
