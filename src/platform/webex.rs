//! Webex: the landing page is a browser-vs-app chooser, and the prejoin
//! form sometimes requires an email field before accepting a name. There is
//! no scriptable live-captions toggle exposed to a guest join, so
//! `enable_captions` is a no-op here.

use async_trait::async_trait;

use super::common::{disable_av, dismiss_dialogs, enter_name, navigate, poll_admission, submit_join};
use super::{JoinOutcome, PlatformAdapter};
use crate::driver::{BrowserDriver, ClickTarget};

const PROBE_JS: &str = "({
    hasLeaveControl: !!document.querySelector('[aria-label*=\"leave meeting\" i]'),
    hasNameInput: !!document.querySelector('input[name=\"name\"], input[placeholder*=name i]')
})";

const SYNTHETIC_EMAIL: &str = "notetaker@example.com";

pub struct WebexAdapter;

#[async_trait]
impl PlatformAdapter for WebexAdapter {
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
            .find_and_click(ClickTarget::AnyText(&["join from your browser", "join in browser"]))
            .await;

        dismiss_dialogs(driver).await;
        enter_name(driver, "input[name=\"name\"], input[placeholder*=name i]", bot_name).await;
        enter_name(driver, "input[type=email]", SYNTHETIC_EMAIL).await;
        disable_av(driver).await;
        submit_join(driver).await;
        poll_admission(driver, PROBE_JS, on_waiting).await
    }

    async fn enable_captions(&self, _driver: &dyn BrowserDriver) {}
}
