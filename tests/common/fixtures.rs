//! Factory functions for the scripted driver states the end-to-end
//! scenarios need: admission probes that resolve `waiting` into
//! `in_meeting`, and caption payloads for the dedup scenario.

use serde_json::{json, Value};

use meeting_capture_engine::driver::fake::FakeBrowserDriverScript;

const WAITING_BODY_TEXT: &str = "waiting for the host to start this meeting";

/// Generous headroom for every `find_and_click` call a join/leave cycle
/// makes (dialog dismissal, name submission, caption toggle, platform
/// post-join dialogs) — tests assert on outcomes, not on which specific
/// click fired, so every click is scripted to succeed.
fn always_clicks(count: usize) -> Vec<bool> {
    vec![true; count]
}

/// A script that reports `waiting_ticks` ticks of a waiting-room body text,
/// then transitions straight to `in_meeting` on the following tick.
pub fn join_success_script(waiting_ticks: usize) -> FakeBrowserDriverScript {
    let mut body_text_queue = vec![WAITING_BODY_TEXT.to_string(); waiting_ticks];
    body_text_queue.push(String::new());
    FakeBrowserDriverScript {
        body_text_queue,
        admission_probe_queue: vec![json!({"hasLeaveControl": true, "hasNameInput": false})],
        click_responses: always_clicks(16),
        ..Default::default()
    }
}

/// A script that reports a waiting-room body text on every tick, so
/// `poll_admission` never observes `in_meeting` and eventually times out.
pub fn join_timeout_script() -> FakeBrowserDriverScript {
    FakeBrowserDriverScript {
        body_text_queue: vec![WAITING_BODY_TEXT.to_string(); 256],
        click_responses: always_clicks(16),
        ..Default::default()
    }
}

/// Caption candidate payloads for the dedup scenario:
/// hello, hello, world, hello -> stored as hello, world, hello.
pub fn caption_dedup_sequence() -> Vec<Value> {
    vec![
        json!([{"speaker": "A", "text": "hello"}]),
        json!([{"speaker": "A", "text": "hello"}]),
        json!([{"speaker": "A", "text": "world"}]),
        json!([{"speaker": "A", "text": "hello"}]),
    ]
}
