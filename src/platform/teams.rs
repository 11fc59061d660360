//! Teams: the React prejoin surface requires "Continue on this browser"
//! before any other control exists, and its camera toggle sometimes has no
//! reachable aria-label, so a first-visible-checkbox fallback and a "Don't
//! use audio" radio are tried after the shared `disable_av` pass.

use async_trait::async_trait;

use super::common::{dismiss_dialogs, enter_name, navigate, poll_admission, submit_join};
use super::{JoinOutcome, PlatformAdapter};
use crate::driver::{BrowserDriver, ClickTarget};

const PROBE_JS: &str = "({
    hasLeaveControl: !!document.querySelector('[aria-label*=\"leave\" i], [data-tid=\"hangup-main-btn\"]'),
    hasNameInput: !!document.querySelector('input[data-tid=\"prejoin-display-name-input\"], input[type=text]')
})";

pub struct TeamsAdapter;

#[async_trait]
impl PlatformAdapter for TeamsAdapter {
    async fn join(
        &self,
        driver: &dyn BrowserDriver,
        url: &str,
        bot_name: &str,
        on_waiting: &(dyn Fn() + Send + Sync),
    ) -> JoinOutcome {
        if let Err(outcome) = navigate(driver, url).await {
            return outcome;
        }
        let _ = driver
            .find_and_click(ClickTarget::AnyText(&["continue on this browser"]))
            .await;
        dismiss_dialogs(driver).await;
        enter_name(
            driver,
            "input[data-tid=\"prejoin-display-name-input\"], input[type=text]",
            bot_name,
        )
        .await;

        teams_disable_av(driver).await;

        submit_join(driver).await;
        poll_admission(driver, PROBE_JS, on_waiting).await
    }

    async fn enable_captions(&self, driver: &dyn BrowserDriver) {
        if driver
            .find_and_click(ClickTarget::AnyText(&["more actions", "more"]))
            .await
            .unwrap_or(false)
        {
            let clicked = driver
                .find_and_click(ClickTarget::AnyText(&["turn on live captions"]))
                .await
                .unwrap_or(false);
            if clicked {
                return;
            }
        }
        let _ = driver.keyboard("Ctrl+Shift+U").await;
    }
}

/// Runs the shared aria-label toggle pass, then Teams-specific fallbacks: a
/// first-visible checkbox (for cameras whose control has no reachable
/// aria-label) and a "Don't use audio" radio if present.
async fn teams_disable_av(driver: &dyn BrowserDriver) {
    super::common::disable_av(driver).await;

    let checkbox_js = "(() => {
        const el = document.querySelector('input[type=checkbox]');
        if (!el || !el.checked) return false;
        el.click();
        return true;
    })()";
    let _ = driver.evaluate(checkbox_js).await;

    let _ = driver
        .find_and_click(ClickTarget::AnyText(&["don't use audio"]))
        .await;
}
