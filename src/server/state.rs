//! Shared handler state.

use std::sync::Arc;

use crate::agent::Assistant;
use crate::store::ConversationStore;
use crate::tools::ToolRegistry;

/// State shared by all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub assistant: Arc<Assistant>,
    pub store: Arc<ConversationStore>,
    pub registry: Arc<ToolRegistry>,
}
