//! Shared test utilities: scripted fakes and fixture factories for
//! exercising `CaptureEngine` without a real browser or FFmpeg binary.

pub mod fixtures;
pub mod mocks;

use std::path::PathBuf;
use tempfile::TempDir;

/// Creates a temporary recordings root for a test. Returns both the
/// `TempDir` (must be kept alive for the duration of the test) and its path.
pub fn create_test_dir() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create temp directory");
    let path = temp_dir.path().to_path_buf();
    (temp_dir, path)
}
