//! Zoom: rewrites `/j/<N>` URLs to the web-client join path, handles the
//! post-join "Join Audio -> Computer audio" dialog, and enables captions via
//! the CC button's "Show Subtitle" submenu with a "More" menu fallback.

use async_trait::async_trait;

use super::common::{disable_av, dismiss_dialogs, enter_name, navigate, poll_admission, submit_join};
use super::{JoinOutcome, PlatformAdapter};
use crate::driver::{BrowserDriver, ClickTarget};

const PROBE_JS: &str = "({
    hasLeaveControl: !!document.querySelector('[aria-label*=\"leave\" i]'),
    hasNameInput: !!document.querySelector('input#inputname, input[placeholder*=name i]')
})";

/// Rewrites the personal-meeting-room shorthand `/j/<id>` into the web
/// client's join path, which is the only URL shape that opens a captioned
/// page inside a headless browser instead of prompting an app download.
fn rewrite_to_web_client(url: &str) -> String {
    let Some(idx) = url.find("/j/") else {
        return url.to_string();
    };
    let (prefix, rest) = url.split_at(idx);
    let after_marker = &rest[3..];
    let (id, query) = match after_marker.find('?') {
        Some(q) => (&after_marker[..q], &after_marker[q..]),
        None => (after_marker, ""),
    };
    format!("{prefix}/wc/{id}/join{query}")
}

pub struct ZoomAdapter;

#[async_trait]
impl PlatformAdapter for ZoomAdapter {
    async fn join(
        &self,
        driver: &dyn BrowserDriver,
        url: &str,
        bot_name: &str,
        on_waiting: &(dyn Fn() + Send + Sync),
    ) -> JoinOutcome {
        let rewritten = rewrite_to_web_client(url);
        if let Err(outcome) = navigate(driver, &rewritten).await {
            return outcome;
        }
        dismiss_dialogs(driver).await;
        enter_name(driver, "input#inputname, input[placeholder*=name i]", bot_name).await;
        disable_av(driver).await;
        submit_join(driver).await;

        let _ = driver
            .find_and_click(ClickTarget::AnyText(&["computer audio", "join with computer audio"]))
            .await;

        poll_admission(driver, PROBE_JS, on_waiting).await
    }

    async fn enable_captions(&self, driver: &dyn BrowserDriver) {
        let cc_clicked = driver
            .find_and_click(ClickTarget::AnyText(&["cc", "closed caption"]))
            .await
            .unwrap_or(false);
        if cc_clicked {
            let _ = driver
                .find_and_click(ClickTarget::AnyText(&["show subtitle"]))
                .await;
            return;
        }
        if driver
            .find_and_click(ClickTarget::AnyText(&["more"]))
            .await
            .unwrap_or(false)
        {
            let _ = driver
                .find_and_click(ClickTarget::AnyText(&["show captions", "show subtitle"]))
                .await;
        }
    }
}
