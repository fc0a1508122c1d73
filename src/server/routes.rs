//! Route handlers.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use chrono::Utc;
use futures::stream::Stream;
use futures::StreamExt;
use tracing::{error, info};

use crate::types::{ChatOutcome, ChatStreamEvent};

use super::dto::{
    sanitize_message, sanitize_session_id, CapabilitiesBody, CapabilityBody, ChatRequestBody,
    ErrorBody, HealthBody, HistoryBody, MessageBody, SessionListBody,
};
use super::error::{error_response, public_message};
use super::state::AppState;

type ErrorReply = (StatusCode, Json<ErrorBody>);

fn resolve_session_id(payload: &ChatRequestBody) -> Option<String> {
    payload
        .session_id
        .as_deref()
        .and_then(sanitize_session_id)
}

/// POST /chat
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<Json<ChatOutcome>, ErrorReply> {
    let message = sanitize_message(&payload.message);
    let session_id = resolve_session_id(&payload);
    info!(session = session_id.as_deref(), "received /chat request");

    match state
        .assistant
        .process_message(&message, session_id.as_deref())
        .await
    {
        Ok(outcome) => Ok(Json(outcome)),
        Err(e) => {
            error!(error = %e, "chat request failed");
            Err(error_response(&e))
        }
    }
}

/// POST /chat/stream
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequestBody>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ErrorReply> {
    let message = sanitize_message(&payload.message);
    let session_id = resolve_session_id(&payload);
    info!(session = session_id.as_deref(), "received /chat/stream request");

    let stream = state
        .assistant
        .stream_message(&message, session_id.as_deref())
        .await
        .map_err(|e| {
            error!(error = %e, "stream request rejected");
            error_response(&e)
        })?;

    let events = stream.map(|item| {
        let event = match item {
            Ok(ChatStreamEvent::Chunk {
                content,
                full_response,
            }) => Event::default().event("chunk").json_data(serde_json::json!({
                "content": content,
                "fullResponse": full_response,
            })),
            Ok(ChatStreamEvent::Complete {
                response,
                session_id,
                timestamp,
            }) => Event::default()
                .event("complete")
                .json_data(serde_json::json!({
                    "response": response,
                    "sessionId": session_id,
                    "timestamp": timestamp,
                })),
            Err(e) => {
                error!(error = %e, "stream failed mid-response");
                Event::default()
                    .event("error")
                    .json_data(serde_json::json!({"error": public_message(&e)}))
            }
        };
        Ok(event.unwrap_or_else(|_| Event::default().event("error").data("event serialization failed")))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// DELETE /session/{id}
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageBody>, ErrorReply> {
    if state.store.clear(&id).await {
        info!(session = %id, "session cleared");
        Ok(Json(MessageBody {
            message: "Session cleared successfully",
        }))
    } else {
        Err((
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Session not found".to_string(),
                code: "session_not_found",
            }),
        ))
    }
}

/// GET /session/{id}/history
pub async fn session_history(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<HistoryBody> {
    let turns = state.store.history(&id, None).await;
    Json(HistoryBody {
        session_id: id,
        turns,
    })
}

/// GET /sessions
pub async fn list_sessions(State(state): State<AppState>) -> Json<SessionListBody> {
    let sessions = state.store.session_ids().await;
    let count = sessions.len();
    Json(SessionListBody { sessions, count })
}

/// GET /capabilities
pub async fn capabilities(State(state): State<AppState>) -> Json<CapabilitiesBody> {
    let tools = state
        .registry
        .descriptors()
        .into_iter()
        .map(|d| CapabilityBody {
            name: d.name,
            description: d.description,
        })
        .collect();
    Json(CapabilitiesBody { tools })
}

/// GET /health
pub async fn health() -> Json<HealthBody> {
    Json(HealthBody {
        status: "ok",
        service: "Storefront Assistant API",
        timestamp: Utc::now(),
    })
}
