//! Shared join state machine: `navigate -> dismiss_dialogs -> enter_name ->
//! disable_av -> submit_join -> (poll for admission)`. Every per-platform
//! adapter composes these steps with its own URL rewriting, post-join
//! dialogs, and caption strategy.

use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use super::{AdmissionState, JoinOutcome};
use crate::constants::{
    ADMISSION_POLL_INTERVAL_SECS, ADMISSION_POLL_MAX_TICKS, NAVIGATION_TIMEOUT_SECS,
};
use crate::driver::{BrowserDriver, ClickTarget, MediaPermission};

const DISMISS_TEXTS: &[&str] = &[
    "got it",
    "accept cookies",
    "accept all",
    "continue on this browser",
];

const SUBMIT_TEXTS: &[&str] = &["join now", "ask to join", "join meeting", "continue without"];

const WAITING_MARKERS: &[&str] = &[
    "asking to join",
    "waiting for",
    "someone will let you in",
    "waiting room",
    "please wait",
    "lobby",
];

/// `navigate`. Zoom's caller is expected to have already rewritten the URL.
pub async fn navigate(driver: &dyn BrowserDriver, url: &str) -> Result<(), JoinOutcome> {
    driver
        .open(url, Duration::from_secs(NAVIGATION_TIMEOUT_SECS))
        .await
        .map_err(|e| JoinOutcome::Rejected(e.to_string()))
}

/// `dismiss_dialogs`. Best-effort: every candidate is tried, none failing
/// the join if absent.
pub async fn dismiss_dialogs(driver: &dyn BrowserDriver) {
    for text in DISMISS_TEXTS {
        let _ = driver.find_and_click(ClickTarget::AnyText(&[text])).await;
    }
}

/// `enter_name`. Routes through the keyboard-typing path per the driver
/// contract — direct value assignment would silently fail on React targets.
pub async fn enter_name(driver: &dyn BrowserDriver, selector: &str, bot_name: &str) {
    if let Err(e) = driver.type_text(selector, bot_name).await {
        debug!(selector, error = %e, "name field not found or not typeable");
    }
}

/// `disable_av`. Clicks the microphone/camera toggles iff currently ON, by
/// aria-label match. Evaluates a DOM probe rather than relying on
/// `find_and_click` because "is this control currently on" needs inspecting
/// `aria-pressed`/class state, not just presence.
pub async fn disable_av(driver: &dyn BrowserDriver) {
    for label in ["microphone", "camera", "video"] {
        let js = format!(
            "(() => {{
                const needle = {label:?};
                const el = Array.from(document.querySelectorAll('[aria-label]'))
                    .find(n => (n.getAttribute('aria-label') || '').toLowerCase().includes(needle));
                if (!el) return false;
                const pressed = el.getAttribute('aria-pressed');
                const isOn = pressed === 'true' || !el.className.toLowerCase().includes('off');
                if (isOn) {{ el.click(); return true; }}
                return false;
            }})()"
        );
        match driver.evaluate(&js).await {
            Ok(Value::Bool(true)) => debug!(label, "toggled av control off"),
            Ok(_) => {}
            Err(e) => debug!(label, error = %e, "av toggle probe failed"),
        }
    }
}

/// `submit_join`. Text-predicate click first, raw coordinate click as the
/// fallback for non-`<button>` click handlers.
pub async fn submit_join(driver: &dyn BrowserDriver) -> bool {
    match driver.find_and_click(ClickTarget::AnyText(SUBMIT_TEXTS)).await {
        Ok(true) => true,
        _ => {
            let js = "(() => {
                const needle = ['join now', 'ask to join', 'join meeting', 'continue without'];
                const nodes = Array.from(document.querySelectorAll('button, [role=\"button\"]'));
                const hit = nodes.find(n => needle.some(t => (n.textContent || '').trim().toLowerCase().includes(t)));
                if (!hit) return null;
                const r = hit.getBoundingClientRect();
                return [r.left + r.width / 2, r.top + r.height / 2];
            })()";
            match driver.evaluate(js).await {
                Ok(Value::Array(coords)) if coords.len() == 2 => {
                    let x = coords[0].as_f64().unwrap_or(0.0);
                    let y = coords[1].as_f64().unwrap_or(0.0);
                    driver.click_at(x, y).await.is_ok()
                }
                _ => false,
            }
        }
    }
}

/// Evaluates the platform's admission probe and classifies the result per
/// the shared body-text heuristics. `probe_js` must return an object
/// `{hasLeaveControl: bool, hasNameInput: bool}`; the waiting-room text scan
/// is performed here uniformly across platforms.
pub async fn classify_admission(driver: &dyn BrowserDriver, probe_js: &str) -> AdmissionState {
    let body_text_lower = driver
        .evaluate("document.body ? document.body.innerText.toLowerCase() : ''")
        .await
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    if WAITING_MARKERS.iter().any(|m| body_text_lower.contains(m)) {
        return AdmissionState::Waiting;
    }

    let probe = driver.evaluate(probe_js).await.unwrap_or(Value::Null);
    let has_leave_control = probe
        .get("hasLeaveControl")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let has_name_input = probe
        .get("hasNameInput")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if has_leave_control {
        AdmissionState::InMeeting
    } else if has_name_input {
        AdmissionState::Prejoin
    } else {
        AdmissionState::Waiting
    }
}

/// Polls `classify_admission` at 1 Hz for up to `ADMISSION_POLL_MAX_TICKS`
/// ticks, re-issuing `submit_join` whenever the page regresses to
/// `prejoin`. Transitions to `in_meeting` exactly once — the loop returns
/// as soon as that state is observed, regardless of how long it spent in
/// `prejoin` beforehand. `on_waiting` fires once, on the first tick
/// classified as `Waiting`.
pub async fn poll_admission(
    driver: &dyn BrowserDriver,
    probe_js: &str,
    on_waiting: &(dyn Fn() + Send + Sync),
) -> JoinOutcome {
    let mut notified_waiting = false;
    for tick in 0..ADMISSION_POLL_MAX_TICKS {
        match classify_admission(driver, probe_js).await {
            AdmissionState::InMeeting => return JoinOutcome::Succeeded,
            AdmissionState::Prejoin => {
                if !submit_join(driver).await {
                    warn!(tick, "prejoin state persisted and resubmission found no target");
                }
            }
            AdmissionState::Waiting => {
                if !notified_waiting {
                    on_waiting();
                    notified_waiting = true;
                }
            }
        }
        tokio::time::sleep(Duration::from_secs(ADMISSION_POLL_INTERVAL_SECS)).await;
    }
    JoinOutcome::TimedOut
}

pub async fn grant_media_permissions(driver: &dyn BrowserDriver, origin: &str) {
    if let Err(e) = driver
        .grant_permissions(
            origin,
            &[
                MediaPermission::Microphone,
                MediaPermission::Camera,
                MediaPermission::Notifications,
            ],
        )
        .await
    {
        warn!(origin, error = %e, "permission grant failed; proceeding without");
    }
}

/// A minimal fallback adapter for [`crate::model::Platform::Unknown`] URLs:
/// runs the shared pattern with no platform-specific quirks and no caption
/// strategy, since an unrecognized UI has no known caption DOM to query.
pub struct GenericAdapter;

#[async_trait::async_trait]
impl super::PlatformAdapter for GenericAdapter {
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
        enter_name(driver, "input[type=text]", bot_name).await;
        disable_av(driver).await;
        submit_join(driver).await;
        let probe = "({hasLeaveControl: !!document.querySelector('[aria-label*=leave i]'), hasNameInput: !!document.querySelector('input[type=text]')})";
        poll_admission(driver, probe, on_waiting).await
    }

    async fn enable_captions(&self, _driver: &dyn BrowserDriver) {}
}
