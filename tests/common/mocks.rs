//! A `BrowserLauncher` that always hands back the same pre-scripted
//! `BrowserDriver`, so integration tests can configure one `FakeBrowserDriver`
//! and wire it straight into a `CaptureEngine` without a real Chrome process.

use std::sync::Arc;

use async_trait::async_trait;
use meeting_capture_engine::driver::{BrowserDriver, Viewport};
use meeting_capture_engine::error::{EngineError, Result};
use meeting_capture_engine::engine::BrowserLauncher;

pub struct FixedLauncher {
    driver: Arc<dyn BrowserDriver>,
}

impl FixedLauncher {
    pub fn new(driver: Arc<dyn BrowserDriver>) -> Self {
        Self { driver }
    }
}

#[async_trait]
impl BrowserLauncher for FixedLauncher {
    async fn launch(&self, _viewport: Viewport) -> Result<Arc<dyn BrowserDriver>> {
        Ok(self.driver.clone())
    }
}

/// A launcher that always fails, for exercising the (currently untested by
/// the spec's scenarios) browser-launch-failure path.
pub struct FailingLauncher;

#[async_trait]
impl BrowserLauncher for FailingLauncher {
    async fn launch(&self, _viewport: Viewport) -> Result<Arc<dyn BrowserDriver>> {
        Err(EngineError::Configuration(
            "fake browser launch failure".to_string(),
        ))
    }
}
