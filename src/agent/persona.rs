//! Agent persona: behavioral instructions plus fixed model parameters.

use crate::config::schema::ModelConfig;
use crate::errors::PromptError;
use crate::prompt::script::InterviewScript;

/// The configured persona bound to one agent instance.
///
/// Immutable once constructed; created once per session and discarded when
/// the session ends.
#[derive(Debug, Clone)]
pub struct Persona {
    pub instructions: String,
    pub model: String,
    pub voice: String,
    pub temperature: f64,
}

impl Persona {
    /// Build a persona. Rejects empty instruction text: an agent with no
    /// instructions cannot behave meaningfully.
    pub fn new(
        instructions: String,
        model: String,
        voice: String,
        temperature: f64,
    ) -> Result<Self, PromptError> {
        if instructions.trim().is_empty() {
            return Err(PromptError::EmptyInstructions);
        }
        Ok(Self {
            instructions,
            model,
            voice,
            temperature,
        })
    }

    /// Build a persona from a resolved interview script and the process-wide
    /// model parameters.
    pub fn from_script(script: &InterviewScript, model: &ModelConfig) -> Result<Self, PromptError> {
        Self::new(
            script.instructions(),
            model.model.clone(),
            model.voice.clone(),
            model.temperature,
        )
    }
}
