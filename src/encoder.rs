//! Drives the short-lived FFmpeg invocation that joins numbered PNG frames
//! (plus optional audio) into a single MP4. Runs once per session, during
//! `Leave` or `RecoverOrphan`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{AUDIO_MIN_USABLE_BYTES, ENCODER_CRF, ENCODER_TIMEOUT_SECS, ENCODER_VIDEO_BITRATE_KBPS};
use crate::error::EngineError;
use crate::ffmpeg::FfmpegClient;

pub struct EncodeRequest {
    pub frames_dir: PathBuf,
    pub audio_path: Option<PathBuf>,
    pub video_path: PathBuf,
    pub framerate: u32,
}

fn audio_is_usable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.len() > AUDIO_MIN_USABLE_BYTES)
        .unwrap_or(false)
}

fn build_args(request: &EncodeRequest, with_audio: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-framerate".into(),
        request.framerate.to_string().into(),
        "-i".into(),
        request.frames_dir.join("frame_%06d.png").into(),
    ];
    if with_audio {
        if let Some(audio_path) = &request.audio_path {
            args.push("-i".into());
            args.push(audio_path.clone().into());
        }
    }
    args.push("-c:v".into());
    args.push("libx264".into());
    args.push("-pix_fmt".into());
    args.push("yuv420p".into());
    if with_audio {
        args.push("-c:a".into());
        args.push("aac".into());
        args.push("-b:a".into());
        args.push(ENCODER_VIDEO_BITRATE_KBPS.into());
    }
    args.push("-crf".into());
    args.push(ENCODER_CRF.into());
    args.push("-preset".into());
    args.push("fast".into());
    if with_audio {
        args.push("-shortest".into());
    }
    args.push("-y".into());
    args.push(request.video_path.clone().into());
    args
}

/// Returns `Ok(Some(video_path))` on success, `Ok(None)` if there were no
/// frames to encode (the caller never invokes FFmpeg in that case), or
/// `Err(EncoderFailure)` on a non-zero exit or timeout — non-terminal to
/// the session, frames are left on disk for later recovery.
pub async fn encode(
    ffmpeg: &Arc<dyn FfmpegClient>,
    request: EncodeRequest,
) -> Result<Option<PathBuf>, EngineError> {
    let with_audio = request
        .audio_path
        .as_deref()
        .map(audio_is_usable)
        .unwrap_or(false);
    let args = build_args(&request, with_audio);
    ffmpeg
        .run_encode(args, Duration::from_secs(ENCODER_TIMEOUT_SECS))
        .await?;
    Ok(Some(request.video_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffmpeg::MockFfmpegClient;

    /// `build_args` already covers the two argument shapes in isolation;
    /// this drives `encode` end-to-end against a `mockall` expectation on
    /// the actual audio-presence predicate, which a hand-written fake would
    /// only assert after the fact.
    #[tokio::test]
    async fn encode_selects_audio_shape_only_when_file_is_usable() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("s1_audio.mp3");
        std::fs::write(&audio_path, vec![0u8; AUDIO_MIN_USABLE_BYTES as usize + 1]).unwrap();

        let mut mock = MockFfmpegClient::new();
        mock.expect_run_encode()
            .withf(|args, _timeout| args.iter().any(|a| a == "aac"))
            .times(1)
            .returning(|_, _| Ok(()));
        let ffmpeg: Arc<dyn FfmpegClient> = Arc::new(mock);

        let request = EncodeRequest {
            frames_dir: dir.path().join("s1_frames"),
            audio_path: Some(audio_path),
            video_path: dir.path().join("s1_video.mp4"),
            framerate: 2,
        };
        let video_path = encode(&ffmpeg, request).await.unwrap();
        assert!(video_path.unwrap().ends_with("s1_video.mp4"));
    }

    #[tokio::test]
    async fn encode_drops_audio_shape_when_file_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let audio_path = dir.path().join("s1_audio.mp3");
        std::fs::write(&audio_path, b"tiny").unwrap();

        let mut mock = MockFfmpegClient::new();
        mock.expect_run_encode()
            .withf(|args, _timeout| !args.iter().any(|a| a == "aac"))
            .times(1)
            .returning(|_, _| Ok(()));
        let ffmpeg: Arc<dyn FfmpegClient> = Arc::new(mock);

        let request = EncodeRequest {
            frames_dir: dir.path().join("s1_frames"),
            audio_path: Some(audio_path),
            video_path: dir.path().join("s1_video.mp4"),
            framerate: 2,
        };
        encode(&ffmpeg, request).await.unwrap();
    }

    #[test]
    fn video_only_omits_audio_input_and_codec() {
        let request = EncodeRequest {
            frames_dir: PathBuf::from("/tmp/s1_frames"),
            audio_path: None,
            video_path: PathBuf::from("/tmp/s1_video.mp4"),
            framerate: 2,
        };
        let args = build_args(&request, false);
        assert!(!args.iter().any(|a| a == "-shortest"));
        assert!(!args.iter().any(|a| a == "aac"));
    }

    #[test]
    fn with_audio_includes_second_input_and_aac() {
        let request = EncodeRequest {
            frames_dir: PathBuf::from("/tmp/s1_frames"),
            audio_path: Some(PathBuf::from("/tmp/s1_audio.mp3")),
            video_path: PathBuf::from("/tmp/s1_video.mp4"),
            framerate: 2,
        };
        let args = build_args(&request, true);
        assert!(args.iter().any(|a| a == "aac"));
        assert!(args.iter().any(|a| a == "-shortest"));
        assert!(args.iter().any(|a| a.to_string_lossy().contains("s1_audio.mp3")));
    }
}
