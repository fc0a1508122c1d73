//! The state machine that drives model calls and tool rounds.
//!
//! One `process_message` call moves through: resolve the session, build a
//! bounded context, call the model, execute requested tools and feed their
//! results back, and finally record the exchange. Tool rounds are capped;
//! when the cap is hit the model is told to answer directly, and if that
//! also fails the caller still gets a well-formed (if generic) response.

use std::sync::Arc;

use chrono::Utc;
use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::config::AssistantConfig;
use crate::error::ShopkeepError;
use crate::provider::{ChatModel, ModelMessage, ModelReply, ModelRequest, ReplyDelta};
use crate::store::ConversationStore;
use crate::tools::{ToolInvoker, ToolRegistry};
use crate::types::{ChatOutcome, ChatStreamEvent, Role, Turn};
use crate::util::with_timeout;

/// Response returned when the model cannot produce an answer within the
/// tool-round bound.
pub const FALLBACK_RESPONSE: &str =
    "I wasn't able to finish working through that request. Please try again or rephrase your question.";

const DIRECT_ANSWER_INSTRUCTION: &str =
    "Answer the user's request directly using what you already know from this conversation. Do not request any more tools.";

const DEFAULT_SYSTEM_PROMPT: &str = "You are the GameZone shopping assistant, an expert consultant \
for a gaming store. Help customers find products, compare deals, check component compatibility, \
and plan complete setups. Use the available tools whenever you need concrete product, deal, or \
pricing information instead of guessing. Be friendly and concise.";

/// The conversational assistant.
///
/// Shared state is behind `Arc`s, so one `Assistant` handle serves any
/// number of concurrent requests; per-session ordering is the
/// [`ConversationStore`]'s job.
pub struct Assistant {
    model: Arc<dyn ChatModel>,
    store: Arc<ConversationStore>,
    registry: Arc<ToolRegistry>,
    invoker: ToolInvoker,
    config: AssistantConfig,
    system_prompt: String,
}

impl Assistant {
    /// Create an assistant over a model, store, and tool registry.
    pub fn new(
        model: Arc<dyn ChatModel>,
        store: Arc<ConversationStore>,
        registry: Arc<ToolRegistry>,
        config: AssistantConfig,
    ) -> Self {
        let invoker = ToolInvoker::new(Arc::clone(&registry), config.tool_timeout);
        Self {
            model,
            store,
            registry,
            invoker,
            config,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Replace the default system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Process one user message against a session.
    ///
    /// # Errors
    ///
    /// Returns [`ShopkeepError::InvalidInput`] for an empty or oversized
    /// message, and provider/timeout errors when the model itself is
    /// unreachable. Tool faults never surface here; they are fed back into
    /// the model as observations.
    pub async fn process_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatOutcome, ShopkeepError> {
        self.validate(message)?;
        let session_id = self.store.get_or_create(session_id).await;
        debug!(session = %session_id, "processing message");

        let mut messages = self.base_context(&session_id, message).await;
        let descriptors = self.registry.descriptors();
        let mut tools_used = Vec::new();
        let mut rounds = 0usize;

        let response = loop {
            let request = ModelRequest::new(messages.clone()).with_tools(descriptors.clone());
            let reply = self.call_model(&request).await?;

            match reply {
                ModelReply::Answer(text) => break text,
                ModelReply::ToolCall { tool, argument } => {
                    if rounds >= self.config.max_tool_rounds {
                        warn!(
                            session = %session_id,
                            rounds,
                            "tool round bound reached, forcing a direct answer"
                        );
                        break self.force_direct_answer(&mut messages).await;
                    }
                    rounds += 1;
                    info!(session = %session_id, tool = %tool, round = rounds, "tool requested");

                    let outcome = self.invoker.invoke(&tool, &argument).await;
                    tools_used.push(tool.clone());
                    messages.push(ModelMessage::tool_call(tool.as_str(), argument.as_str()));
                    messages.push(ModelMessage::observation(tool.as_str(), outcome.observation()));
                }
            }
        };

        self.store
            .append_exchange(
                &session_id,
                Turn::user(message),
                Turn::assistant(response.clone()),
            )
            .await?;

        info!(session = %session_id, tools = tools_used.len(), "message processed");
        Ok(ChatOutcome {
            response,
            session_id,
            timestamp: Utc::now(),
            tools_used,
        })
    }

    /// Process one user message, emitting the answer incrementally.
    ///
    /// The returned stream yields `Chunk` events as text is produced and a
    /// terminal `Complete` event after the exchange has been recorded. The
    /// session append happens exactly once, right before `Complete`;
    /// dropping the stream earlier leaves the session untouched.
    pub async fn stream_message(
        self: &Arc<Self>,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<BoxStream<'static, Result<ChatStreamEvent, ShopkeepError>>, ShopkeepError> {
        self.validate(message)?;
        let session_id = self.store.get_or_create(session_id).await;

        let assistant = Arc::clone(self);
        let message = message.to_string();

        let stream = async_stream::stream! {
            let mut messages = assistant.base_context(&session_id, &message).await;
            let descriptors = assistant.registry.descriptors();
            let mut rounds = 0usize;
            let mut full_response = String::new();
            let mut forcing = false;

            loop {
                let request = if forcing {
                    ModelRequest::new(messages.clone())
                } else {
                    ModelRequest::new(messages.clone()).with_tools(descriptors.clone())
                };

                let mut deltas = match with_timeout(
                    assistant.config.model_timeout,
                    assistant.model.stream(&request),
                )
                .await
                {
                    Ok(deltas) => deltas,
                    Err(e) if forcing => {
                        warn!(error = %e, "forced direct answer failed");
                        break;
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let mut tool_request = None;
                loop {
                    let Some(delta) = deltas.next().await else { break };
                    match delta {
                        Ok(ReplyDelta::Text(text)) => {
                            if text.is_empty() {
                                continue;
                            }
                            full_response.push_str(&text);
                            yield Ok(ChatStreamEvent::Chunk {
                                content: text,
                                full_response: full_response.clone(),
                            });
                        }
                        Ok(ReplyDelta::ToolCall { tool, argument }) => {
                            tool_request = Some((tool, argument));
                            break;
                        }
                        Ok(ReplyDelta::Done) => break,
                        Err(e) if forcing => {
                            warn!(error = %e, "forced direct answer failed");
                            break;
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                match tool_request {
                    Some((tool, argument)) if !forcing => {
                        if rounds >= assistant.config.max_tool_rounds {
                            warn!(
                                session = %session_id,
                                rounds,
                                "tool round bound reached, forcing a direct answer"
                            );
                            messages.push(ModelMessage::user(DIRECT_ANSWER_INSTRUCTION));
                            forcing = true;
                            continue;
                        }
                        rounds += 1;
                        info!(session = %session_id, tool = %tool, round = rounds, "tool requested");

                        let outcome = assistant.invoker.invoke(&tool, &argument).await;
                        messages.push(ModelMessage::tool_call(tool.as_str(), argument.as_str()));
                        messages.push(ModelMessage::observation(
                            tool.as_str(),
                            outcome.observation(),
                        ));
                    }
                    _ => break,
                }
            }

            if full_response.is_empty() {
                full_response = FALLBACK_RESPONSE.to_string();
                yield Ok(ChatStreamEvent::Chunk {
                    content: full_response.clone(),
                    full_response: full_response.clone(),
                });
            }

            // Atomic append: nothing is recorded unless the stream ran to
            // completion.
            if let Err(e) = assistant
                .store
                .append_exchange(
                    &session_id,
                    Turn::user(message.as_str()),
                    Turn::assistant(full_response.clone()),
                )
                .await
            {
                yield Err(e);
                return;
            }

            yield Ok(ChatStreamEvent::Complete {
                response: full_response,
                session_id: session_id.clone(),
                timestamp: Utc::now(),
            });
        };

        Ok(Box::pin(stream))
    }

    // -- Internal helpers --

    fn validate(&self, message: &str) -> Result<(), ShopkeepError> {
        if message.trim().is_empty() {
            return Err(ShopkeepError::InvalidInput(
                "message cannot be empty".into(),
            ));
        }
        let len = message.chars().count();
        if len > self.config.max_message_len {
            return Err(ShopkeepError::InvalidInput(format!(
                "message too long: {len} characters exceeds the limit of {}",
                self.config.max_message_len
            )));
        }
        Ok(())
    }

    /// System prompt, the most recent retained turns, and the new user
    /// message.
    async fn base_context(&self, session_id: &str, message: &str) -> Vec<ModelMessage> {
        let history = self
            .store
            .history(session_id, Some(self.config.max_history))
            .await;

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ModelMessage::system(self.system_prompt.clone()));
        for turn in history {
            messages.push(match turn.role {
                Role::User => ModelMessage::user(turn.content),
                Role::Assistant => ModelMessage::assistant(turn.content),
            });
        }
        messages.push(ModelMessage::user(message));
        messages
    }

    async fn call_model(&self, request: &ModelRequest) -> Result<ModelReply, ShopkeepError> {
        with_timeout(self.config.model_timeout, self.model.complete(request)).await
    }

    /// One last model call with tools withheld. Degrades to the static
    /// fallback instead of erroring; the round bound was already spent.
    async fn force_direct_answer(&self, messages: &mut Vec<ModelMessage>) -> String {
        messages.push(ModelMessage::user(DIRECT_ANSWER_INSTRUCTION));
        let request = ModelRequest::new(messages.clone());
        match self.call_model(&request).await {
            Ok(ModelReply::Answer(text)) if !text.trim().is_empty() => text,
            Ok(_) => FALLBACK_RESPONSE.to_string(),
            Err(e) => {
                warn!(error = %e, "forced direct answer failed");
                FALLBACK_RESPONSE.to_string()
            }
        }
    }
}
