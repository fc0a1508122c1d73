//! Streaming response events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events produced by the streaming chat path.
///
/// A stream is a finite, non-restartable sequence of `Chunk` events followed
/// by exactly one terminal `Complete` event. The transport (SSE or anything
/// else) is the boundary layer's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ChatStreamEvent {
    /// Incremental text plus the full response accumulated so far.
    Chunk {
        content: String,
        full_response: String,
    },
    /// Terminal event carrying the final assembled response.
    Complete {
        response: String,
        session_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl ChatStreamEvent {
    /// Whether this is the terminal event of a stream.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }
}
