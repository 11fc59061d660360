//! Real `FfmpegClient`, shelling out to the binary at `EngineConfig::ffmpeg_path`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, Command};
use tracing::warn;

use super::{FfmpegCaptureHandle, FfmpegClient};
use crate::error::EngineError;

pub struct SystemFfmpeg {
    binary: PathBuf,
}

impl SystemFfmpeg {
    pub fn new(binary: PathBuf) -> Self {
        Self { binary }
    }
}

#[async_trait]
impl FfmpegClient for SystemFfmpeg {
    async fn spawn_capture(
        &self,
        args: Vec<OsString>,
        output_path: PathBuf,
    ) -> Result<Box<dyn FfmpegCaptureHandle>, EngineError> {
        let child = Command::new(&self.binary)
            .args(&args)
            .arg(&output_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| EngineError::AudioUnavailable(e.to_string()))?;
        Ok(Box::new(SystemCaptureHandle { child }))
    }

    async fn run_encode(&self, args: Vec<OsString>, timeout: Duration) -> Result<(), EngineError> {
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EngineError::EncoderFailure(e.to_string()))?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) if status.success() => Ok(()),
            Ok(Ok(status)) => Err(EngineError::EncoderFailure(format!(
                "ffmpeg exited with {status}"
            ))),
            Ok(Err(e)) => Err(EngineError::EncoderFailure(e.to_string())),
            Err(_) => {
                let _ = child.kill().await;
                Err(EngineError::EncoderFailure(format!(
                    "encode timed out after {timeout:?}"
                )))
            }
        }
    }
}

struct SystemCaptureHandle {
    child: Child,
}

#[async_trait]
impl FfmpegCaptureHandle for SystemCaptureHandle {
    async fn request_quit(&mut self) {
        if let Some(stdin) = self.child.stdin.as_mut() {
            if let Err(e) = stdin.write_all(b"q").await {
                warn!(error = %e, "failed to write graceful-quit to ffmpeg stdin");
            }
        }
    }

    async fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!(error = %e, "failed to send terminate signal to ffmpeg");
        }
    }

    async fn wait(&mut self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.child.wait()).await,
            Ok(Ok(_))
        )
    }
}
