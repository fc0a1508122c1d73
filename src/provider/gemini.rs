//! Google Gemini API provider.

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::debug;

use crate::error::ShopkeepError;

use super::http::{parse_sse_data, shared_client, status_to_error};
use super::{ChatModel, ContextRole, ModelReply, ModelRequest, ReplyDelta, ToolDescriptor};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// [`ChatModel`] implementation over the Gemini `generateContent` API.
pub struct GeminiModel {
    model: String,
    api_key: String,
    base_url: String,
    temperature: Option<f32>,
}

impl GeminiModel {
    pub fn new(model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
            temperature: None,
        }
    }

    /// Override the API base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn build_request_body(&self, request: &ModelRequest) -> serde_json::Value {
        let mut system_instruction: Option<String> = None;
        let mut contents = Vec::new();

        for msg in &request.messages {
            match msg.role {
                ContextRole::System => match system_instruction {
                    Some(ref mut existing) => {
                        existing.push_str("\n\n");
                        existing.push_str(&msg.content);
                    }
                    None => system_instruction = Some(msg.content.clone()),
                },
                ContextRole::User => {
                    contents.push(serde_json::json!({
                        "role": "user",
                        "parts": [{"text": msg.content}],
                    }));
                }
                ContextRole::Assistant => match msg.tool_name {
                    Some(ref tool) => {
                        contents.push(serde_json::json!({
                            "role": "model",
                            "parts": [{
                                "functionCall": {
                                    "name": tool,
                                    "args": {"input": msg.content},
                                }
                            }],
                        }));
                    }
                    None => {
                        contents.push(serde_json::json!({
                            "role": "model",
                            "parts": [{"text": msg.content}],
                        }));
                    }
                },
                ContextRole::Tool => {
                    let name = msg.tool_name.as_deref().unwrap_or("tool");
                    contents.push(serde_json::json!({
                        "role": "function",
                        "parts": [{
                            "functionResponse": {
                                "name": name,
                                "response": {"output": msg.content},
                            }
                        }],
                    }));
                }
            }
        }

        let mut body = serde_json::json!({ "contents": contents });
        let obj = body
            .as_object_mut()
            .expect("request body is always a JSON object");

        if let Some(sys) = system_instruction {
            obj.insert(
                "systemInstruction".into(),
                serde_json::json!({"parts": [{"text": sys}]}),
            );
        }

        if let Some(temperature) = self.temperature {
            obj.insert(
                "generationConfig".into(),
                serde_json::json!({"temperature": temperature}),
            );
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let fn_decls: Vec<serde_json::Value> =
                    tools.iter().map(function_declaration).collect();
                obj.insert(
                    "tools".into(),
                    serde_json::json!([{"functionDeclarations": fn_decls}]),
                );
            }
        }

        body
    }
}

/// Every tool takes a single string argument, so all declarations share the
/// same one-field schema.
fn function_declaration(tool: &ToolDescriptor) -> serde_json::Value {
    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "parameters": {
            "type": "object",
            "properties": {
                "input": {
                    "type": "string",
                    "description": "Input for the tool",
                }
            },
            "required": ["input"],
        },
    })
}

fn argument_from_args(args: Option<serde_json::Value>) -> String {
    match args {
        Some(serde_json::Value::Object(ref map)) => match map.get("input") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => serde_json::Value::Object(map.clone()).to_string(),
        },
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

#[async_trait]
impl ChatModel for GeminiModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &ModelRequest) -> Result<ModelReply, ShopkeepError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(model = %self.model, "Gemini complete");

        let resp = shared_client().post(&url).json(&body).send().await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let data: GeminiResponse = resp.json().await?;

        let candidate = data
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| ShopkeepError::api(200, "No candidates in Gemini response"))?;

        let mut text = String::new();
        for part in candidate.content.parts {
            if let Some(fc) = part.function_call {
                return Ok(ModelReply::ToolCall {
                    tool: fc.name,
                    argument: argument_from_args(fc.args),
                });
            }
            if let Some(t) = part.text {
                text.push_str(&t);
            }
        }

        Ok(ModelReply::Answer(text))
    }

    async fn stream(
        &self,
        request: &ModelRequest,
    ) -> Result<BoxStream<'static, Result<ReplyDelta, ShopkeepError>>, ShopkeepError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.base_url, self.model, self.api_key
        );

        debug!(model = %self.model, "Gemini stream");

        let resp = shared_client().post(&url).json(&body).send().await?;

        let status = resp.status().as_u16();
        if status != 200 {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status, &body_text));
        }

        let byte_stream = resp.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer = String::new();
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(ShopkeepError::Network(e));
                        break;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));

                while let Some(line_end) = buffer.find('\n') {
                    let line = buffer[..line_end].trim().to_string();
                    buffer = buffer[line_end + 1..].to_string();

                    let Some(data) = parse_sse_data(&line) else {
                        continue;
                    };
                    let Ok(resp) = serde_json::from_str::<GeminiResponse>(data) else {
                        continue;
                    };
                    let Some(candidate) = resp.candidates.into_iter().next() else {
                        continue;
                    };
                    for part in candidate.content.parts {
                        if let Some(fc) = part.function_call {
                            yield Ok(ReplyDelta::ToolCall {
                                tool: fc.name,
                                argument: argument_from_args(fc.args),
                            });
                            yield Ok(ReplyDelta::Done);
                            return;
                        }
                        if let Some(t) = part.text {
                            yield Ok(ReplyDelta::Text(t));
                        }
                    }
                    if candidate.finish_reason.is_some() {
                        yield Ok(ReplyDelta::Done);
                        return;
                    }
                }
            }

            yield Ok(ReplyDelta::Done);
        };

        Ok(Box::pin(stream))
    }
}

// Internal Gemini response types

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: GeminiContent,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    text: Option<String>,
    function_call: Option<GeminiFunctionCall>,
}

#[derive(Deserialize)]
struct GeminiFunctionCall {
    name: String,
    args: Option<serde_json::Value>,
}
