//! Conversation event types emitted by a realtime session.
//!
//! Content is a tagged union with an explicit discriminant, dispatched via
//! exhaustive pattern matching.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}

/// Handle to one turn's worth of raw audio, plus its shape.
///
/// The bytes are opaque here; encoding and playback belong to the external
/// framework. Only the metadata is logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AudioFrame {
    pub data: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioFrame {
    /// Human-readable shape summary for log lines.
    pub fn describe(&self) -> String {
        format!(
            "{} bytes @ {}Hz x{}",
            self.data.len(),
            self.sample_rate,
            self.channels
        )
    }
}

/// One piece of a conversation item's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ContentPart {
    Text {
        text: String,
    },
    Audio {
        frame: AudioFrame,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transcript: Option<String>,
    },
}

/// One turn's worth of content emitted by the session.
///
/// Ephemeral: exists for the duration of the event callback; nothing here
/// is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationItem {
    pub role: Role,
    /// Flattened text of the turn.
    pub text: String,
    /// Whether the speaker was cut off mid-turn.
    pub interrupted: bool,
    /// Ordered content parts (text and/or audio).
    pub content: Vec<ContentPart>,
    pub timestamp: DateTime<Local>,
}

impl ConversationItem {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            interrupted: false,
            content: Vec::new(),
            timestamp: Local::now(),
        }
    }
}

/// Events emitted by a realtime session.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// A conversation turn was committed to the session history.
    ConversationItemAdded(ConversationItem),
    /// The stream errored. A `Closed` event follows.
    Error(String),
    /// The model stream ended; no further events will arrive.
    Closed,
}
