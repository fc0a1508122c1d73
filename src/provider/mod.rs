//! Model provider contract.
//!
//! The underlying language model is a black box behind [`ChatModel`]: given a
//! system instruction, an ordered message context, and an optional list of
//! tool descriptors, it returns either a final text answer or a structured
//! tool-call request. Swapping providers must not require any orchestrator
//! change.

#[cfg(feature = "gemini")]
pub mod gemini;
#[cfg(feature = "gemini")]
pub mod http;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::ShopkeepError;

/// Role of a model-facing context message.
///
/// Distinct from the persisted [`Role`](crate::types::Role): tool
/// observations appear in the model context but are never stored as turns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContextRole {
    System,
    User,
    Assistant,
    Tool,
}

/// A message in the model-facing context.
///
/// `tool_name` is set on the two message kinds that make up a tool round:
/// the assistant's call echo and the observation fed back. Providers that
/// support native function calling map those onto their wire format;
/// everything else can flatten them to text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    pub role: ContextRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ModelMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ContextRole::System,
            content: content.into(),
            tool_name: None,
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ContextRole::User,
            content: content.into(),
            tool_name: None,
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ContextRole::Assistant,
            content: content.into(),
            tool_name: None,
        }
    }

    /// Create an assistant message echoing a tool call. The content is the
    /// raw argument string.
    pub fn tool_call(tool: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            role: ContextRole::Assistant,
            content: argument.into(),
            tool_name: Some(tool.into()),
        }
    }

    /// Create a tool observation message.
    pub fn observation(tool: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ContextRole::Tool,
            content: content.into(),
            tool_name: Some(tool.into()),
        }
    }
}

/// Tool descriptor advertised to the model.
///
/// The description is consumed by the model to decide when to use the tool;
/// no code logic branches on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
}

/// A request sent to the underlying model.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub messages: Vec<ModelMessage>,
    pub tools: Option<Vec<ToolDescriptor>>,
}

impl ModelRequest {
    pub fn new(messages: Vec<ModelMessage>) -> Self {
        Self {
            messages,
            tools: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = if tools.is_empty() { None } else { Some(tools) };
        self
    }
}

/// Reply of a single model call.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A final text answer.
    Answer(String),
    /// A structured request to invoke a tool.
    ToolCall { tool: String, argument: String },
}

/// Incremental unit of a streamed reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyDelta {
    /// Incremental text of a final answer.
    Text(String),
    /// The model decided to invoke a tool instead of answering.
    ToolCall { tool: String, argument: String },
    /// End of the streamed reply.
    Done,
}

/// Core trait implemented by all model providers.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Produce a complete reply (non-streaming).
    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, ShopkeepError>;

    /// Produce a streamed reply.
    ///
    /// The default implementation adapts [`complete`](Self::complete) into a
    /// single delta; providers with native streaming override this.
    async fn stream(
        &self,
        request: &ModelRequest,
    ) -> Result<BoxStream<'static, Result<ReplyDelta, ShopkeepError>>, ShopkeepError> {
        let reply = self.complete(request).await?;
        let deltas = match reply {
            ModelReply::Answer(text) => vec![Ok(ReplyDelta::Text(text)), Ok(ReplyDelta::Done)],
            ModelReply::ToolCall { tool, argument } => {
                vec![Ok(ReplyDelta::ToolCall { tool, argument }), Ok(ReplyDelta::Done)]
            }
        };
        Ok(Box::pin(futures::stream::iter(deltas)))
    }
}
