//! Structured status events emitted by a session's join and recording lifecycle.
//!
//! There is no GUI surface here — these are the "emits structured status" hooks
//! the spec gives `PlatformAdapter`, fanned out over a broadcast channel so an
//! external collaborator (the out-of-scope HTTP API) can subscribe without the
//! engine knowing anything about its transport.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::model::Platform;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    WaitingInLobby {
        meeting_id: String,
    },
    InMeeting {
        meeting_id: String,
        platform: Platform,
    },
    JoinFailed {
        meeting_id: String,
        reason: String,
    },
    RecordingStarted {
        meeting_id: String,
    },
    RecordingPaused {
        meeting_id: String,
    },
    RecordingResumed {
        meeting_id: String,
    },
    Ended {
        meeting_id: String,
    },
}

const EVENT_BUS_CAPACITY: usize = 256;

/// Fan-out publisher for `SessionEvent`s. Cloning is cheap; every clone shares
/// the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _receiver) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish never fails the caller: a closed-channel send (no subscribers)
    /// is exactly as harmless as a dropped driver screenshot.
    pub fn publish(&self, event: SessionEvent) {
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
