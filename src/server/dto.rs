//! Wire DTOs and boundary input sanitation.
//!
//! The wire format is camelCase, matching the JSON contract of the chat
//! endpoints. Sanitation is a boundary concern: the core only enforces the
//! empty/too-long message rules.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::Turn;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequestBody {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionListBody {
    pub sessions: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryBody {
    pub session_id: String,
    pub turns: Vec<Turn>,
}

#[derive(Debug, Serialize)]
pub struct CapabilityBody {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesBody {
    pub tools: Vec<CapabilityBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthBody {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageBody {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?is)<script\b.*?</script>").expect("valid script pattern"))
}

fn tag_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"))
}

/// Strip script blocks and HTML tags from a message.
pub fn sanitize_message(message: &str) -> String {
    let without_scripts = script_pattern().replace_all(message, "");
    let without_tags = tag_pattern().replace_all(&without_scripts, "");
    without_tags.trim().to_string()
}

/// Restrict a session id to URL-safe characters. Returns `None` when
/// nothing survives.
pub fn sanitize_session_id(id: &str) -> Option<String> {
    let cleaned: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}
