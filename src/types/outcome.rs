//! Result of one processed message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the caller gets back from one `process_message` exchange.
///
/// `tools_used` lists the tools invoked during this exchange, in invocation
/// order; it is observability data for the single response payload and is
/// not persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    pub response: String,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub tools_used: Vec<String>,
}
