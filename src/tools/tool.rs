//! Tool trait and closure-based tool wrapper.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ShopkeepError;

/// A named capability the model may request during a conversation round.
///
/// Tools take a single string argument and produce a string result; failures
/// are surfaced as errors and converted to observations by the invoker, never
/// propagated past it.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (must match what the model calls).
    fn name(&self) -> &str;

    /// Human-readable description, consumed by the model to decide when to
    /// use the tool.
    fn description(&self) -> &str;

    /// Execute the tool with the raw argument string.
    async fn invoke(&self, argument: &str) -> Result<String, ShopkeepError>;
}

/// Type alias for the tool handler function.
type ToolHandler = dyn Fn(String) -> Pin<Box<dyn Future<Output = Result<String, ShopkeepError>> + Send>>
    + Send
    + Sync;

/// Closure-based tool for quick tool creation.
pub struct FnTool {
    name: String,
    description: String,
    handler: Arc<ToolHandler>,
}

impl FnTool {
    /// Create a tool from a closure.
    pub fn new<F, Fut>(name: impl Into<String>, description: impl Into<String>, handler: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String, ShopkeepError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            handler: Arc::new(move |argument| Box::pin(handler(argument))),
        }
    }
}

#[async_trait]
impl Tool for FnTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    async fn invoke(&self, argument: &str) -> Result<String, ShopkeepError> {
        (self.handler)(argument.to_string()).await
    }
}

impl std::fmt::Debug for FnTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}
