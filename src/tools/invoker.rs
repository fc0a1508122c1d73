//! Uniform tool invocation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::registry::ToolRegistry;

/// Kind of tool failure, fed back to the model as an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolFailure {
    UnknownTool,
    ExecutionFailed,
    TimedOut,
}

/// Outcome of one tool invocation.
///
/// Failures are data, not errors: the orchestrator feeds them back into the
/// model context and the model gets a chance to recover within its remaining
/// rounds.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    Success(String),
    Failure { kind: ToolFailure, message: String },
}

impl ToolOutcome {
    /// Text representation fed back to the model as an observation.
    pub fn observation(&self) -> String {
        match self {
            Self::Success(text) => text.clone(),
            Self::Failure { kind, message } => match kind {
                ToolFailure::UnknownTool => format!("Tool error: {message}"),
                ToolFailure::ExecutionFailed => format!("Tool failed: {message}"),
                ToolFailure::TimedOut => format!("Tool timed out: {message}"),
            },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Looks tools up in the registry, invokes them, and normalizes the result.
///
/// A tool fault never propagates past this type as an error.
#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Invoke a tool by name with a raw argument string.
    pub async fn invoke(&self, name: &str, argument: &str) -> ToolOutcome {
        let Some(tool) = self.registry.get(name) else {
            warn!(tool = name, "unknown tool requested");
            return ToolOutcome::Failure {
                kind: ToolFailure::UnknownTool,
                message: format!("no tool named '{name}' is registered"),
            };
        };

        match tokio::time::timeout(self.timeout, tool.invoke(argument)).await {
            Ok(Ok(text)) => {
                debug!(tool = name, output_len = text.len(), "tool succeeded");
                ToolOutcome::Success(text)
            }
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "tool failed");
                ToolOutcome::Failure {
                    kind: ToolFailure::ExecutionFailed,
                    message: e.to_string(),
                }
            }
            Err(_) => {
                warn!(tool = name, timeout_ms = self.timeout.as_millis() as u64, "tool timed out");
                ToolOutcome::Failure {
                    kind: ToolFailure::TimedOut,
                    message: format!(
                        "tool '{name}' did not finish within {}ms",
                        self.timeout.as_millis()
                    ),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ShopkeepError;
    use crate::tools::tool::{FnTool, Tool};

    fn registry_with(tools: Vec<Arc<dyn Tool>>) -> Arc<ToolRegistry> {
        let mut registry = ToolRegistry::new();
        for tool in tools {
            registry.register(tool).unwrap();
        }
        Arc::new(registry)
    }

    #[tokio::test]
    async fn invoke_returns_success_text() {
        let registry = registry_with(vec![Arc::new(FnTool::new(
            "greet",
            "greets",
            |argument| async move { Ok(format!("hello {argument}")) },
        ))]);
        let invoker = ToolInvoker::new(registry, Duration::from_secs(1));

        let outcome = invoker.invoke("greet", "world").await;
        assert_eq!(outcome, ToolOutcome::Success("hello world".into()));
    }

    #[tokio::test]
    async fn unknown_tool_becomes_failure_outcome() {
        let invoker = ToolInvoker::new(registry_with(Vec::new()), Duration::from_secs(1));

        let outcome = invoker.invoke("calcx", "1+1").await;
        assert!(matches!(
            outcome,
            ToolOutcome::Failure {
                kind: ToolFailure::UnknownTool,
                ..
            }
        ));
        assert!(outcome.observation().contains("calcx"));
    }

    #[tokio::test]
    async fn tool_error_becomes_failure_outcome() {
        let registry = registry_with(vec![Arc::new(FnTool::new(
            "broken",
            "always fails",
            |_argument| async move { Err(ShopkeepError::tool("broken", "boom")) },
        ))]);
        let invoker = ToolInvoker::new(registry, Duration::from_secs(1));

        let outcome = invoker.invoke("broken", "").await;
        assert!(matches!(
            outcome,
            ToolOutcome::Failure {
                kind: ToolFailure::ExecutionFailed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn slow_tool_times_out() {
        let registry = registry_with(vec![Arc::new(FnTool::new(
            "slow",
            "sleeps forever",
            |_argument| async move {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(String::new())
            },
        ))]);
        let invoker = ToolInvoker::new(registry, Duration::from_millis(20));

        let outcome = invoker.invoke("slow", "").await;
        assert!(matches!(
            outcome,
            ToolOutcome::Failure {
                kind: ToolFailure::TimedOut,
                ..
            }
        ));
    }
}
