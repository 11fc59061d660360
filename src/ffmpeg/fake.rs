//! Scripted `FfmpegClient` for tests — never shells out. `spawn_capture`
//! writes a stub MP3-shaped file immediately (long enough to clear
//! `AUDIO_MIN_USABLE_BYTES`) and `run_encode` writes a stub MP4 at the last
//! path argument, unless configured to fail or hang past its timeout.

use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{FfmpegCaptureHandle, FfmpegClient};
use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct FakeFfmpegScript {
    pub encode_fails: bool,
    pub encode_hangs: bool,
    pub capture_fails: bool,
}

pub struct FakeFfmpeg {
    script: FakeFfmpegScript,
    encode_calls: Arc<std::sync::Mutex<Vec<Vec<OsString>>>>,
}

impl FakeFfmpeg {
    pub fn new(script: FakeFfmpegScript) -> Self {
        Self {
            script,
            encode_calls: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn encode_calls(&self) -> Vec<Vec<OsString>> {
        self.encode_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FfmpegClient for FakeFfmpeg {
    async fn spawn_capture(
        &self,
        _args: Vec<OsString>,
        output_path: PathBuf,
    ) -> Result<Box<dyn FfmpegCaptureHandle>, EngineError> {
        if self.script.capture_fails {
            return Err(EngineError::AudioUnavailable(
                "fake audio device unavailable".to_string(),
            ));
        }
        std::fs::write(&output_path, vec![0u8; 8 * 1024])
            .map_err(|e| EngineError::AudioUnavailable(e.to_string()))?;
        Ok(Box::new(FakeCaptureHandle {
            stopped: AtomicBool::new(false),
        }))
    }

    async fn run_encode(&self, args: Vec<OsString>, timeout: Duration) -> Result<(), EngineError> {
        self.encode_calls.lock().unwrap().push(args.clone());

        if self.script.encode_hangs {
            tokio::time::sleep(timeout + Duration::from_millis(50)).await;
            return Err(EngineError::EncoderFailure(format!(
                "encode timed out after {timeout:?}"
            )));
        }
        if self.script.encode_fails {
            return Err(EngineError::EncoderFailure(
                "fake ffmpeg exited non-zero".to_string(),
            ));
        }
        let output_path = args
            .last()
            .ok_or_else(|| EngineError::EncoderFailure("no output path argument".to_string()))?;
        std::fs::write(output_path, b"fake-mp4")
            .map_err(|e| EngineError::EncoderFailure(e.to_string()))?;
        Ok(())
    }
}

struct FakeCaptureHandle {
    stopped: AtomicBool,
}

#[async_trait]
impl FfmpegCaptureHandle for FakeCaptureHandle {
    async fn request_quit(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    async fn terminate(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    async fn wait(&mut self, _timeout: Duration) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
