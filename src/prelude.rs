//! Convenience re-exports for common use.

pub use crate::agent::{Assistant, SessionSweeper, FALLBACK_RESPONSE};
pub use crate::config::AssistantConfig;
pub use crate::error::{Result, ShopkeepError};
pub use crate::provider::{
    ChatModel, ContextRole, ModelMessage, ModelReply, ModelRequest, ReplyDelta, ToolDescriptor,
};
pub use crate::store::ConversationStore;
pub use crate::tools::{FnTool, Tool, ToolInvoker, ToolOutcome, ToolRegistry};
pub use crate::types::{ChatOutcome, ChatStreamEvent, Role, Turn};

#[cfg(feature = "gemini")]
pub use crate::provider::gemini::GeminiModel;
