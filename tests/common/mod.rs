//! Scripted model fakes shared across integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::stream::BoxStream;

use shopkeep::agent::Assistant;
use shopkeep::config::AssistantConfig;
use shopkeep::error::ShopkeepError;
use shopkeep::provider::{ChatModel, ModelReply, ModelRequest, ReplyDelta};
use shopkeep::store::ConversationStore;
use shopkeep::tools::{storefront, ToolRegistry};

/// Replays a fixed sequence of replies; the last reply repeats forever.
/// Records every request it receives for later inspection.
pub struct ScriptedModel {
    replies: Mutex<Vec<ModelReply>>,
    pub requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelReply>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn answer(text: &str) -> Arc<Self> {
        Self::new(vec![ModelReply::Answer(text.to_string())])
    }

    /// Requests recorded so far.
    pub fn recorded(&self) -> Vec<ModelRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    fn model_id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, ShopkeepError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push(request.clone());
        let mut replies = self.replies.lock().expect("replies lock");
        match replies.len() {
            0 => Err(ShopkeepError::Provider("script exhausted".into())),
            1 => Ok(replies[0].clone()),
            _ => Ok(replies.remove(0)),
        }
    }
}

/// Always fails, for provider-error propagation tests.
pub struct FailingModel;

#[async_trait]
impl ChatModel for FailingModel {
    fn model_id(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &ModelRequest) -> Result<ModelReply, ShopkeepError> {
        Err(ShopkeepError::Provider("rate limit exceeded".into()))
    }
}

/// Streams scripted rounds of deltas, one round per `stream` call.
pub struct ChunkedModel {
    rounds: Mutex<Vec<Vec<ReplyDelta>>>,
}

impl ChunkedModel {
    pub fn new(rounds: Vec<Vec<ReplyDelta>>) -> Arc<Self> {
        Arc::new(Self {
            rounds: Mutex::new(rounds),
        })
    }
}

#[async_trait]
impl ChatModel for ChunkedModel {
    fn model_id(&self) -> &str {
        "chunked"
    }

    async fn complete(&self, _request: &ModelRequest) -> Result<ModelReply, ShopkeepError> {
        Err(ShopkeepError::Provider(
            "chunked model only streams".into(),
        ))
    }

    async fn stream(
        &self,
        _request: &ModelRequest,
    ) -> Result<BoxStream<'static, Result<ReplyDelta, ShopkeepError>>, ShopkeepError> {
        let mut rounds = self.rounds.lock().expect("rounds lock");
        if rounds.is_empty() {
            return Err(ShopkeepError::Provider("script exhausted".into()));
        }
        let round = rounds.remove(0);
        Ok(Box::pin(futures::stream::iter(round.into_iter().map(Ok))))
    }
}

/// An assistant over the given model with the full storefront tool set.
pub fn assistant_with(
    model: Arc<dyn ChatModel>,
    config: AssistantConfig,
) -> (Arc<Assistant>, Arc<ConversationStore>) {
    let mut registry = ToolRegistry::new();
    for tool in storefront::all_tools() {
        registry.register(tool).expect("unique tool names");
    }
    let store = Arc::new(ConversationStore::new(config.max_history));
    let assistant = Arc::new(Assistant::new(
        model,
        Arc::clone(&store),
        Arc::new(registry),
        config,
    ));
    (assistant, store)
}
