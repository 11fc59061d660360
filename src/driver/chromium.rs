//! `chromiumoxide`-backed `BrowserDriver`.
//!
//! One `ChromiumDriver` wraps one `chromiumoxide::Page` plus the `Browser`
//! handle that owns it, so `close` can tear down the whole Chrome process
//! rather than just the tab.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::PermissionType;
use chromiumoxide::cdp::browser_protocol::browser::GrantPermissionsParams;
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchKeyEventParams, DispatchKeyEventType, DispatchMouseEventParams,
    DispatchMouseEventType, MouseButton,
};
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::keys;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::Value;
use tracing::warn;

use super::{BrowserDriver, ClickTarget, MediaPermission, Viewport};
use crate::error::DriverError;

pub struct ChromiumDriver {
    browser: Browser,
    page: Page,
}

impl ChromiumDriver {
    /// Launches a headless Chrome instance sized to `viewport` and opens a
    /// single blank tab on it. The background event-pump task is detached:
    /// this driver's lifetime is the session's lifetime, and `close` is the
    /// only thing that ever tears it down.
    pub async fn launch(viewport: Viewport) -> Result<Self, DriverError> {
        let config = BrowserConfig::builder()
            .window_size(viewport.width, viewport.height)
            .build()
            .map_err(DriverError::Navigation)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        tokio::spawn(async move { while handler.next().await.is_some() {} });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        Ok(Self { browser, page })
    }
}

#[async_trait]
impl BrowserDriver for ChromiumDriver {
    async fn open(&self, url: &str, timeout: Duration) -> Result<(), DriverError> {
        tokio::time::timeout(timeout, self.page.goto(url))
            .await
            .map_err(|_| DriverError::Timeout(timeout))?
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        tokio::time::timeout(timeout, self.page.wait_for_navigation())
            .await
            .map_err(|_| DriverError::Timeout(timeout))?
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn evaluate(&self, js_source: &str) -> Result<Value, DriverError> {
        let result = self
            .page
            .evaluate(js_source)
            .await
            .map_err(|e| DriverError::Evaluate(e.to_string()))?;
        result
            .into_value()
            .map_err(|e| DriverError::Evaluate(e.to_string()))
    }

    async fn find_and_click(&self, target: ClickTarget<'_>) -> Result<bool, DriverError> {
        match target {
            ClickTarget::Selector(selector) => match self.page.find_element(selector).await {
                Ok(element) => match element.click().await {
                    Ok(_) => Ok(true),
                    Err(e) => {
                        warn!(selector, error = %e, "click failed on matched element");
                        Ok(false)
                    }
                },
                Err(_) => Ok(false),
            },
            ClickTarget::AnyText(candidates) => {
                for text in candidates {
                    let js = format!(
                        "(() => {{
                            const needle = {text:?}.toLowerCase();
                            const nodes = Array.from(document.querySelectorAll('button, [role=\"button\"], a'));
                            const hit = nodes.find(n => (n.textContent || '').trim().toLowerCase().includes(needle));
                            if (!hit) return false;
                            hit.click();
                            return true;
                        }})()"
                    );
                    match self.evaluate(&js).await {
                        Ok(Value::Bool(true)) => return Ok(true),
                        Ok(_) => continue,
                        Err(_) => continue,
                    }
                }
                Ok(false)
            }
        }
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<(), DriverError> {
        let press = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MousePressed)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(DriverError::Navigation)?;
        let release = DispatchMouseEventParams::builder()
            .r#type(DispatchMouseEventType::MouseReleased)
            .x(x)
            .y(y)
            .button(MouseButton::Left)
            .click_count(1)
            .build()
            .map_err(DriverError::Navigation)?;

        self.page
            .execute(press)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.page
            .execute(release)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn type_text(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        element
            .click()
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;

        let select_all_and_clear = "(() => {
            const el = document.activeElement;
            if (el && 'value' in el) el.value = '';
        })()";
        let _ = self.evaluate(select_all_and_clear).await;

        for ch in text.chars() {
            element
                .type_str(ch.to_string())
                .await
                .map_err(|e| DriverError::Navigation(e.to_string()))?;
            tokio::time::sleep(Duration::from_millis(
                crate::constants::TYPE_TEXT_KEY_DELAY_MS,
            ))
            .await;
        }
        Ok(())
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(false)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .map_err(|e| DriverError::Screenshot(e.to_string()))?;
        Ok(())
    }

    async fn grant_permissions(
        &self,
        origin: &str,
        permissions: &[MediaPermission],
    ) -> Result<(), DriverError> {
        let mapped: Vec<PermissionType> = permissions
            .iter()
            .map(|p| match p {
                MediaPermission::Microphone => PermissionType::AudioCapture,
                MediaPermission::Camera => PermissionType::VideoCapture,
                MediaPermission::Notifications => PermissionType::Notifications,
            })
            .collect();
        let cmd = GrantPermissionsParams::builder()
            .permissions(mapped)
            .origin(origin.to_string())
            .build()
            .map_err(DriverError::Permission)?;
        self.browser
            .execute(cmd)
            .await
            .map_err(|e| DriverError::Permission(e.to_string()))?;
        Ok(())
    }

    async fn keyboard(&self, shortcut: &str) -> Result<(), DriverError> {
        let key_definition = keys::get_key_definition(shortcut)
            .ok_or_else(|| DriverError::Navigation(format!("Key not found: {shortcut}")))?;
        let mut cmd = DispatchKeyEventParams::builder();
        let key_down_event_type = if let Some(txt) = key_definition.text {
            cmd = cmd.text(txt);
            DispatchKeyEventType::KeyDown
        } else if key_definition.key.len() == 1 {
            cmd = cmd.text(key_definition.key);
            DispatchKeyEventType::KeyDown
        } else {
            DispatchKeyEventType::RawKeyDown
        };
        cmd = cmd
            .r#type(DispatchKeyEventType::KeyDown)
            .key(key_definition.key)
            .code(key_definition.code)
            .windows_virtual_key_code(key_definition.key_code)
            .native_virtual_key_code(key_definition.key_code);

        self.page
            .execute(cmd.clone().r#type(key_down_event_type).build().map_err(DriverError::Navigation)?)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        self.page
            .execute(cmd.r#type(DispatchKeyEventType::KeyUp).build().map_err(DriverError::Navigation)?)
            .await
            .map_err(|e| DriverError::Navigation(e.to_string()))?;
        Ok(())
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            warn!(error = %e, "page close failed during teardown");
        }
    }
}

impl Drop for ChromiumDriver {
    fn drop(&mut self) {
        let _ = self.browser.kill();
    }
}
