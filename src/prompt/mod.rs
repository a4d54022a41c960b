//! Prompt provider: supplies the instruction text for the agent persona.
//!
//! Scripts come from one of two places, selected by configuration: the
//! built-in interview script, or a remote conversation-configuration
//! service keyed by room name.

pub mod remote;
pub mod script;

use std::time::Duration;

use tracing::warn;

use crate::config::schema::PromptConfig;
use crate::errors::PromptError;

pub use remote::RemotePromptClient;
pub use script::{InterviewScript, GREETING_INSTRUCTIONS};

/// Where interview scripts come from.
pub enum PromptSource {
    /// The built-in script, used when no remote service is configured.
    Builtin,
    /// Remote fetch by room name, with an optional built-in fallback.
    Remote {
        client: RemotePromptClient,
        fallback_to_builtin: bool,
    },
}

impl PromptSource {
    /// Build the prompt source described by the configuration.
    pub fn from_config(cfg: &PromptConfig) -> Self {
        match &cfg.base_url {
            Some(base_url) => PromptSource::Remote {
                client: RemotePromptClient::new(
                    base_url.clone(),
                    Duration::from_secs(cfg.timeout_secs),
                    cfg.retry_attempts,
                ),
                fallback_to_builtin: cfg.fallback_to_builtin,
            },
            None => PromptSource::Builtin,
        }
    }

    /// Resolve the interview script for a room.
    ///
    /// A remote failure propagates unless the fallback is enabled, in which
    /// case the built-in script is substituted and the failure logged.
    pub async fn resolve(&self, room_name: &str) -> Result<InterviewScript, PromptError> {
        match self {
            PromptSource::Builtin => Ok(InterviewScript::builtin()),
            PromptSource::Remote {
                client,
                fallback_to_builtin,
            } => match client.fetch(room_name).await {
                Ok(script) => Ok(script),
                Err(e) if *fallback_to_builtin => {
                    warn!(
                        room = room_name,
                        "Prompt fetch failed ({}), falling back to built-in script", e
                    );
                    Ok(InterviewScript::builtin())
                }
                Err(e) => Err(e),
            },
        }
    }
}
