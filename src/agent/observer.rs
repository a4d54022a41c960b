//! Event observer: structured logging of conversation turns.
//!
//! For every conversation item the session emits, one line records the
//! speaker role, text, and interruption flag; each audio part adds one line
//! with its transcript and frame shape. Fire-and-forget per event, and the
//! handler cannot panic: content dispatch is an exhaustive match.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::realtime::events::{ContentPart, ConversationItem, SessionEvent};

/// Render the log lines for one conversation item.
///
/// Exactly one header line, plus one line per audio part.
pub fn describe_item(item: &ConversationItem) -> Vec<String> {
    let mut lines = Vec::with_capacity(1 + item.content.len());
    lines.push(format!(
        "conversation item: role={} interrupted={} text={:?}",
        item.role, item.interrupted, item.text
    ));
    for part in &item.content {
        match part {
            ContentPart::Text { .. } => {}
            ContentPart::Audio { frame, transcript } => {
                lines.push(format!(
                    "  audio part: {} transcript={:?}",
                    frame.describe(),
                    transcript.as_deref().unwrap_or("")
                ));
            }
        }
    }
    lines
}

/// Spawn the observer task for a session's event stream.
///
/// Runs until the stream yields `Closed` or the sender side is dropped.
pub fn spawn_observer(
    room_name: String,
    mut events: mpsc::Receiver<SessionEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                SessionEvent::ConversationItemAdded(item) => {
                    for line in describe_item(&item) {
                        info!(room = %room_name, "{}", line);
                    }
                }
                SessionEvent::Error(e) => {
                    warn!(room = %room_name, "Session stream error: {}", e);
                }
                SessionEvent::Closed => {
                    info!(room = %room_name, "Session stream closed");
                    break;
                }
            }
        }
    })
}
