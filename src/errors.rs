//! Domain error types for voxbot.
//!
//! Typed errors at module boundaries replace string-encoded errors and
//! enable structured error handling via pattern matching.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Prompt errors
// ---------------------------------------------------------------------------

/// Errors from resolving an interview script.
///
/// Embedded in `anyhow::Error` at the entrypoint boundary so callers can
/// downcast: `e.downcast_ref::<PromptError>()`.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Prompt endpoint returned status {status}")]
    BadStatus { status: u16 },

    #[error("Failed to parse prompt response JSON: {0}")]
    JsonParse(String),

    #[error("Prompt response missing expected field: {path}")]
    MissingField { path: String },

    #[error("Instruction text must not be empty")]
    EmptyInstructions,
}

impl PromptError {
    /// Whether a retry could plausibly succeed.
    ///
    /// Transport failures and 5xx responses are transient; client errors and
    /// malformed bodies are not.
    pub fn is_transient(&self) -> bool {
        match self {
            PromptError::Http(_) => true,
            PromptError::BadStatus { status } => *status >= 500,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Session errors
// ---------------------------------------------------------------------------

/// Errors from room and realtime-session lifecycle operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Room connect failed: {0}")]
    RoomConnect(String),

    #[error("Realtime model connect failed: {0}")]
    ModelConnect(String),

    #[error("Realtime session handshake failed: {0}")]
    Handshake(String),

    #[error("Realtime stream error: {0}")]
    Stream(String),

    #[error("Session already closed")]
    Closed,
}
