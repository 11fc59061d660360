//! Per-platform join and caption-enable strategies.
//!
//! An adapter is purely a sequence of [`BrowserDriver`] operations guarded by
//! DOM-state probes — no filesystem or subprocess access, and no error ever
//! crosses the façade boundary unconverted: every adapter returns a
//! structured [`JoinOutcome`].

pub mod common;
pub mod google_meet;
pub mod teams;
pub mod webex;
pub mod zoom;

use async_trait::async_trait;

use crate::driver::BrowserDriver;
use crate::model::Platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Succeeded,
    TimedOut,
    Rejected(String),
}

/// The admission probe's three-way classification of current page state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionState {
    Waiting,
    InMeeting,
    Prejoin,
}

#[async_trait]
pub trait PlatformAdapter: Send + Sync {
    /// `on_waiting` is invoked at most once, the first time the admission
    /// poll observes `AdmissionState::Waiting` — the hook the façade uses to
    /// publish `SessionEvent::WaitingInLobby`.
    async fn join(
        &self,
        driver: &dyn BrowserDriver,
        url: &str,
        bot_name: &str,
        on_waiting: &(dyn Fn() + Send + Sync),
    ) -> JoinOutcome;
    async fn enable_captions(&self, driver: &dyn BrowserDriver);
}

pub fn adapter_for(platform: Platform) -> Box<dyn PlatformAdapter> {
    match platform {
        Platform::Zoom => Box::new(zoom::ZoomAdapter),
        Platform::GoogleMeet => Box::new(google_meet::GoogleMeetAdapter),
        Platform::Teams => Box::new(teams::TeamsAdapter),
        Platform::Webex => Box::new(webex::WebexAdapter),
        Platform::Unknown => Box::new(common::GenericAdapter),
    }
}
