//! Configuration schema for voxbot.
//!
//! All structs use `#[serde(rename_all = "camelCase")]` so that the JSON config
//! file can use camelCase keys while Rust code uses snake_case fields.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Worker config
// ---------------------------------------------------------------------------

/// Room-server connection settings for the worker process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// WebSocket URL of the room server the worker registers with.
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api_secret: String,
    /// Name the worker announces when registering.
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
}

fn default_server_url() -> String {
    "ws://localhost:7880".to_string()
}

fn default_agent_name() -> String {
    "voxbot".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            api_key: String::new(),
            api_secret: String::new(),
            agent_name: default_agent_name(),
        }
    }
}

// ---------------------------------------------------------------------------
// Realtime model config
// ---------------------------------------------------------------------------

/// Parameters for the hosted speech-to-speech model.
///
/// These are fixed per process; the per-session instruction text comes from
/// the prompt source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default)]
    pub api_key: String,
}

fn default_model() -> String {
    "gemini-2.0-flash-exp".to_string()
}

fn default_voice() -> String {
    "Aoede".to_string()
}

fn default_temperature() -> f64 {
    0.8
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            voice: default_voice(),
            temperature: default_temperature(),
            api_key: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt config
// ---------------------------------------------------------------------------

/// Where interview scripts come from.
///
/// When `base_url` is set, scripts are fetched from
/// `{base_url}/api/product-conversations/{room}`; otherwise the built-in
/// script is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: usize,
    /// Substitute the built-in script when the remote fetch fails.
    /// Off by default: a failed fetch aborts the job before any session starts.
    #[serde(default)]
    pub fallback_to_builtin: bool,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_retry_attempts() -> usize {
    3
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: default_timeout_secs(),
            retry_attempts: default_retry_attempts(),
            fallback_to_builtin: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Room input config
// ---------------------------------------------------------------------------

/// Default input-processing options applied to each session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    #[serde(default = "default_noise_cancellation")]
    pub noise_cancellation: bool,
}

fn default_noise_cancellation() -> bool {
    true
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            noise_cancellation: default_noise_cancellation(),
        }
    }
}

// ---------------------------------------------------------------------------
// Root config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub prompt: PromptConfig,
    #[serde(default)]
    pub room: RoomConfig,
}

impl Config {
    /// Overlay credentials and endpoints from environment variables.
    ///
    /// Called once at process startup, after the config file is read. Env
    /// values win over file values so deployments can keep secrets out of
    /// the config file.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("VOXBOT_SERVER_URL") {
            self.worker.server_url = v;
        }
        if let Ok(v) = std::env::var("VOXBOT_API_KEY") {
            self.worker.api_key = v;
        }
        if let Ok(v) = std::env::var("VOXBOT_API_SECRET") {
            self.worker.api_secret = v;
        }
        if let Ok(v) = std::env::var("GEMINI_API_KEY") {
            self.model.api_key = v;
        }
        if let Ok(v) = std::env::var("VOXBOT_PROMPT_BASE_URL") {
            if !v.is_empty() {
                self.prompt.base_url = Some(v);
            }
        }
    }
}
