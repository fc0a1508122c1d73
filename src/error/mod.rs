//! Error types for Shopkeep.

use thiserror::Error;

/// Primary error type for all Shopkeep operations.
#[derive(Error, Debug)]
pub enum ShopkeepError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Tool already registered: {0}")]
    DuplicateTool(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[cfg(feature = "gemini")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Model provider error: {0}")]
    Provider(String),
}

impl ShopkeepError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a tool execution error.
    pub fn tool(tool_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolExecution {
            tool_name: tool_name.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the caller's input.
    ///
    /// Caller faults map to 4xx at the HTTP boundary; everything else is a
    /// 5xx-class failure of this service or an upstream provider.
    pub fn is_caller_fault(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ShopkeepError>;
