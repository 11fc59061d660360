//! Injectable FFmpeg boundary.
//!
//! Two distinct subprocess shapes need FFmpeg: a long-lived audio capture
//! process (started and gracefully stopped by [`crate::recorder::audio`])
//! and a short-lived encode-to-MP4 invocation (driven by [`crate::encoder`]).
//! Both are expressed through one trait so tests can supply a
//! [`fake::FakeFfmpeg`] instead of shelling out, mirroring the teacher's
//! `Command::new(ffmpeg_path).args([...]).output()` pattern for the real
//! implementation.

pub mod fake;
pub mod system;

use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineError;

/// A handle to a running capture subprocess, abstracting over the
/// stdin-quit / terminate / wait sequence that [`crate::recorder::audio`]
/// drives during shutdown.
#[async_trait]
pub trait FfmpegCaptureHandle: Send + Sync {
    /// Writes `q\n` to the process's stdin, requesting a graceful quit.
    async fn request_quit(&mut self);
    /// Sends a terminate signal (SIGTERM on Unix).
    async fn terminate(&mut self);
    /// Waits up to `timeout` for the process to exit; does not force-kill.
    async fn wait(&mut self, timeout: Duration) -> bool;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FfmpegClient: Send + Sync {
    /// Launches a long-lived capture process writing MP3 audio to
    /// `output_path`, configured per OS by `args`.
    async fn spawn_capture(
        &self,
        args: Vec<OsString>,
        output_path: PathBuf,
    ) -> Result<Box<dyn FfmpegCaptureHandle>, EngineError>;

    /// Runs a short-lived encode invocation to completion or `timeout`,
    /// returning `Ok(())` on a zero exit status.
    async fn run_encode(&self, args: Vec<OsString>, timeout: Duration) -> Result<(), EngineError>;
}
