//! Google Meet: the plainest instance of the shared join pattern. Captions
//! are enabled via an aria-labelled "captions"/"subtitles"/"cc" button, or
//! by the `c` keyboard shortcut if none is found.

use async_trait::async_trait;

use super::common::{disable_av, dismiss_dialogs, enter_name, navigate, poll_admission, submit_join};
use super::{JoinOutcome, PlatformAdapter};
use crate::driver::{BrowserDriver, ClickTarget};

const PROBE_JS: &str = "({
    hasLeaveControl: !!document.querySelector('[aria-label*=\"leave call\" i], [aria-label*=\"end call\" i]'),
    hasNameInput: !!document.querySelector('input[type=text], input[aria-label*=name i]')
})";

pub struct GoogleMeetAdapter;

#[async_trait]
impl PlatformAdapter for GoogleMeetAdapter {
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
        dismiss_dialogs(driver).await;
        enter_name(driver, "input[type=text], input[aria-label*=name i]", bot_name).await;
        disable_av(driver).await;
        submit_join(driver).await;
        poll_admission(driver, PROBE_JS, on_waiting).await
    }

    async fn enable_captions(&self, driver: &dyn BrowserDriver) {
        let clicked = driver
            .find_and_click(ClickTarget::AnyText(&["captions", "subtitles", "cc"]))
            .await
            .unwrap_or(false);
        if !clicked {
            let _ = driver.keyboard("c").await;
        }
    }
}
