//! Assistant configuration (code defaults, overridable from the environment).

use std::time::Duration;

const DEFAULT_MAX_HISTORY: usize = 20;
const DEFAULT_MAX_TOOL_ROUNDS: usize = 3;
const DEFAULT_MAX_MESSAGE_LEN: usize = 1000;
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 5;
const DEFAULT_SESSION_MAX_AGE_SECS: u64 = 24 * 60 * 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// Resource bounds and timeouts for the assistant core.
///
/// All limits are supplied at construction; nothing in the core hardcodes
/// them. [`AssistantConfig::from_env`] layers `SHOPKEEP_*` environment
/// overrides on top of the defaults.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Maximum retained turns per session. Oldest turns are evicted first.
    pub max_history: usize,
    /// Maximum tool-invocation rounds per processed message.
    pub max_tool_rounds: usize,
    /// Maximum accepted user message length, in characters.
    pub max_message_len: usize,
    /// Timeout for a single model call.
    pub model_timeout: Duration,
    /// Timeout for a single tool invocation.
    pub tool_timeout: Duration,
    /// Idle age after which a session is evicted by the sweeper.
    pub session_max_age: Duration,
    /// Interval between sweeper passes.
    pub sweep_interval: Duration,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            session_max_age: Duration::from_secs(DEFAULT_SESSION_MAX_AGE_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl AssistantConfig {
    /// Load configuration from environment variables (`.env` honored).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::default();

        if let Some(value) = env_usize("SHOPKEEP_MAX_HISTORY") {
            config.max_history = value;
        }
        if let Some(value) = env_usize("SHOPKEEP_MAX_TOOL_ROUNDS") {
            config.max_tool_rounds = value;
        }
        if let Some(value) = env_usize("SHOPKEEP_MAX_MESSAGE_LEN") {
            config.max_message_len = value;
        }
        if let Some(value) = env_secs("SHOPKEEP_MODEL_TIMEOUT_SECS") {
            config.model_timeout = value;
        }
        if let Some(value) = env_secs("SHOPKEEP_TOOL_TIMEOUT_SECS") {
            config.tool_timeout = value;
        }
        if let Some(value) = env_secs("SHOPKEEP_SESSION_MAX_AGE_SECS") {
            config.session_max_age = value;
        }
        if let Some(value) = env_secs("SHOPKEEP_SWEEP_INTERVAL_SECS") {
            config.sweep_interval = value;
        }

        config
    }
}

fn env_usize(key: &str) -> Option<usize> {
    let value = std::env::var(key).ok()?;
    parse_positive_usize(&value)
}

fn env_secs(key: &str) -> Option<Duration> {
    let value = std::env::var(key).ok()?;
    parse_positive_usize(&value).map(|secs| Duration::from_secs(secs as u64))
}

fn parse_positive_usize(value: &str) -> Option<usize> {
    let parsed = value.trim().parse::<usize>().ok()?;
    if parsed == 0 {
        None
    } else {
        Some(parsed)
    }
}
