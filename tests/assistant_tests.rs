//! End-to-end orchestrator behavior against scripted models.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;

use common::{assistant_with, FailingModel, ScriptedModel};
use shopkeep::config::AssistantConfig;
use shopkeep::error::ShopkeepError;
use shopkeep::prelude::*;

fn config() -> AssistantConfig {
    AssistantConfig::default()
}

#[tokio::test]
async fn fresh_session_gets_generated_id_and_recorded_exchange() {
    let model = ScriptedModel::answer("hello there");
    let (assistant, store) = assistant_with(model, config());

    let outcome = assistant.process_message("hi", None).await.unwrap();

    assert!(!outcome.session_id.is_empty());
    assert!(outcome.tools_used.is_empty());
    assert_eq!(outcome.response, "hello there");

    let history = store.history(&outcome.session_id, None).await;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, Role::User);
    assert_eq!(history[0].content, "hi");
    assert_eq!(history[1].role, Role::Assistant);
    assert_eq!(history[1].content, "hello there");
}

#[tokio::test]
async fn context_includes_system_prompt_and_prior_turns() {
    let model = ScriptedModel::answer("reply");
    let (assistant, _store) = assistant_with(model.clone(), config());

    assistant
        .process_message("first", Some("s1"))
        .await
        .unwrap();
    assistant
        .process_message("second", Some("s1"))
        .await
        .unwrap();

    let requests = model.recorded();
    assert_eq!(requests.len(), 2);

    let second = &requests[1];
    assert_eq!(second.messages[0].role, ContextRole::System);
    let contents: Vec<&str> = second
        .messages
        .iter()
        .map(|m| m.content.as_str())
        .collect();
    assert!(contents.contains(&"first"));
    assert!(contents.contains(&"reply"));
    assert_eq!(second.messages.last().unwrap().content, "second");
}

#[tokio::test]
async fn tool_round_feeds_observation_back_to_model() {
    let model = ScriptedModel::new(vec![
        ModelReply::ToolCall {
            tool: "calculate_price".into(),
            argument: "299.99 + 99.99".into(),
        },
        ModelReply::Answer("That comes to $399.98.".into()),
    ]);
    let (assistant, _store) = assistant_with(model.clone(), config());

    let outcome = assistant.process_message("total?", Some("s1")).await.unwrap();

    assert_eq!(outcome.response, "That comes to $399.98.");
    assert_eq!(outcome.tools_used, vec!["calculate_price".to_string()]);

    let requests = model.recorded();
    assert_eq!(requests.len(), 2);
    let observation = requests[1]
        .messages
        .iter()
        .find(|m| m.role == ContextRole::Tool)
        .expect("observation message present");
    assert_eq!(observation.content, "Total: $399.98");
    assert_eq!(observation.tool_name.as_deref(), Some("calculate_price"));
}

#[tokio::test]
async fn round_bound_is_enforced_with_fallback() {
    // The model asks for tools forever; after R rounds the forced direct
    // answer also fails, so the caller still gets the generic fallback.
    let model = ScriptedModel::new(vec![ModelReply::ToolCall {
        tool: "get_current_deals".into(),
        argument: String::new(),
    }]);
    let mut cfg = config();
    cfg.max_tool_rounds = 2;
    let (assistant, _store) = assistant_with(model, cfg);

    let outcome = assistant.process_message("loop", Some("s1")).await.unwrap();

    assert!(outcome.tools_used.len() <= 2);
    assert!(!outcome.response.is_empty());
    assert_eq!(outcome.response, FALLBACK_RESPONSE);
}

#[tokio::test]
async fn forced_direct_answer_is_used_when_the_model_complies() {
    let model = ScriptedModel::new(vec![
        ModelReply::ToolCall {
            tool: "get_current_deals".into(),
            argument: String::new(),
        },
        ModelReply::ToolCall {
            tool: "get_current_deals".into(),
            argument: String::new(),
        },
        ModelReply::ToolCall {
            tool: "get_current_deals".into(),
            argument: String::new(),
        },
        ModelReply::Answer("Here is what I found so far.".into()),
    ]);
    let mut cfg = config();
    cfg.max_tool_rounds = 2;
    let (assistant, _store) = assistant_with(model, cfg);

    let outcome = assistant.process_message("loop", Some("s1")).await.unwrap();

    assert_eq!(outcome.response, "Here is what I found so far.");
    assert_eq!(outcome.tools_used.len(), 2);
}

#[tokio::test]
async fn unknown_tool_request_recovers_within_round_bound() {
    // Typoed tool name: the failure is fed back as an observation and the
    // model gets a chance to self-correct.
    let model = ScriptedModel::new(vec![
        ModelReply::ToolCall {
            tool: "calcx".into(),
            argument: "1 + 1".into(),
        },
        ModelReply::Answer("Sorry, let me just answer: $2.00.".into()),
    ]);
    let (assistant, _store) = assistant_with(model.clone(), config());

    let outcome = assistant.process_message("add", Some("s1")).await.unwrap();

    assert_eq!(outcome.response, "Sorry, let me just answer: $2.00.");

    let requests = model.recorded();
    let observation = requests[1]
        .messages
        .iter()
        .find(|m| m.role == ContextRole::Tool)
        .expect("observation message present");
    assert!(observation.content.contains("calcx"));
    assert!(observation.content.contains("Tool error"));
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let (assistant, store) = assistant_with(ScriptedModel::answer("x"), config());

    let err = assistant.process_message("   ", Some("s1")).await.unwrap_err();
    assert!(matches!(err, ShopkeepError::InvalidInput(_)));
    assert!(store.history("s1", None).await.is_empty());
}

#[tokio::test]
async fn oversized_message_is_rejected() {
    let mut cfg = config();
    cfg.max_message_len = 10;
    let (assistant, _store) = assistant_with(ScriptedModel::answer("x"), cfg);

    let err = assistant
        .process_message("this message is longer than ten characters", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ShopkeepError::InvalidInput(_)));
}

#[tokio::test]
async fn provider_error_propagates_without_recording_turns() {
    let (assistant, store) = assistant_with(Arc::new(FailingModel), config());

    let err = assistant.process_message("hi", Some("s1")).await.unwrap_err();
    assert!(matches!(err, ShopkeepError::Provider(_)));
    assert!(store.history("s1", None).await.is_empty());
}

#[tokio::test]
async fn history_stays_bounded_across_many_exchanges() {
    let mut cfg = config();
    cfg.max_history = 4;
    let (assistant, store) = assistant_with(ScriptedModel::answer("ok"), cfg);

    for i in 0..5 {
        assistant
            .process_message(&format!("message {i}"), Some("s1"))
            .await
            .unwrap();
    }

    let history = store.history("s1", None).await;
    assert_eq!(history.len(), 4);
    // Only the most recent exchanges survive.
    assert_eq!(history[0].content, "message 3");
}

#[tokio::test]
async fn sessions_remain_isolated() {
    let (assistant, store) = assistant_with(ScriptedModel::answer("ok"), config());

    assistant.process_message("to a", Some("a")).await.unwrap();
    assistant.process_message("to b", Some("b")).await.unwrap();

    let history_b = store.history("b", None).await;
    assert_eq!(history_b.len(), 2);
    assert_eq!(history_b[0].content, "to b");
}

#[tokio::test]
async fn concurrent_exchanges_against_one_session_all_land() {
    let (assistant, store) = assistant_with(ScriptedModel::answer("ok"), config());
    store.get_or_create(Some("shared")).await;

    let mut handles = Vec::new();
    for i in 0..2 {
        let assistant = Arc::clone(&assistant);
        handles.push(tokio::spawn(async move {
            assistant
                .process_message(&format!("message {i}"), Some("shared"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let history = store.history("shared", None).await;
    assert_eq!(history.len(), 4);
    for pair in history.chunks(2) {
        assert_eq!(pair[0].role, Role::User);
        assert_eq!(pair[1].role, Role::Assistant);
    }
}
