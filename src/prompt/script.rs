//! Interview scripts: the instruction text handed to the agent persona.

use serde::{Deserialize, Serialize};

/// Instruction sent with the first reply request, right after session start.
pub const GREETING_INSTRUCTIONS: &str =
    "Greet the user and tell them the reason for the call.";

/// Built-in interview script used when no remote prompt service is configured.
const BUILTIN_SYSTEM_PROMPT: &str = "\
Role:
You are Maya, a product manager at a collaborative notes platform. Your tone \
is warm, calm, and personal. You listen closely and you genuinely care about \
making the user's experience better.

Objective:
You are having a friendly one-on-one conversation with a loyal user to gather \
feedback on a planned feature: recording and embedding voice notes directly \
inside pages. The feature is still in the planning stage.

Context:
This is an honest, informal conversation, not a sales call. You want to learn \
whether the user has ever felt the need to capture their thinking out loud, \
and to understand their working style, needs, and pain points. Your goal is \
to collect real, useful insights that will shape the feature's design.

Instructions:
Open gently and personally. Ask open questions, listen carefully, reflect \
back what you hear, and confirm you understood. Ask follow-up questions when \
something is worth digging into, but keep the conversation light and polite.";

const BUILTIN_QUESTIONS: [&str; 4] = [
    "What do you use the product for most?",
    "Is there ever a moment when you want to jot something down quickly but don't feel like typing?",
    "If you could add a voice note to a page just by speaking, where would that help you most?",
    "Could a feature like this be useful when working with your team or friends?",
];

/// One interview's worth of behavioral instructions.
///
/// Mirrors the remote conversation record: a system prompt plus an ordered
/// list of questions the interviewer should work through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewScript {
    pub system_prompt: String,
    #[serde(default)]
    pub questions: Vec<String>,
}

impl InterviewScript {
    /// The built-in product-feedback interview script.
    pub fn builtin() -> Self {
        Self {
            system_prompt: BUILTIN_SYSTEM_PROMPT.to_string(),
            questions: BUILTIN_QUESTIONS.iter().map(|q| q.to_string()).collect(),
        }
    }

    /// Render the full instruction text for the persona.
    ///
    /// The question list, when present, is appended as a numbered guide so
    /// the model works through it in order.
    pub fn instructions(&self) -> String {
        if self.questions.is_empty() {
            return self.system_prompt.clone();
        }
        let mut out = self.system_prompt.clone();
        out.push_str("\n\nQuestions to cover, in order:\n");
        for (i, q) in self.questions.iter().enumerate() {
            out.push_str(&format!("{}. {}\n", i + 1, q));
        }
        out
    }
}
