//! OpenRouter provider implementation using the Responses API.
//!
//! This module uses OpenAI Responses API terminology:
//! - "input" (array of messages, not "context")
//! - "role" (not "source")
//! - SSE events: response.output_text.delta, response.function_call_arguments.done

use std::collections::HashMap;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::inference::{
    CompletionProvider, CompletionRequest, ContextItem, ProviderError, Source, StreamChunk,
    ToolCall, ToolDefinition,
};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

// ============================================================================
// OpenRouter Responses API Types
// ============================================================================

/// Role in an input message (OpenAI terminology)
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
enum Role {
    System,
    User,
    Assistant,
}

/// Polymorphic input item for the Responses API input array.
/// Messages, function calls, and function call outputs are peers at the same level.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type")]
enum InputItem {
    #[serde(rename = "message")]
    Message { role: Role, content: String },
    #[serde(rename = "function_call")]
    FunctionCall {
        id: String,
        call_id: String,
        name: String,
        arguments: String,
    },
    #[serde(rename = "function_call_output")]
    FunctionCallOutput {
        id: String,
        call_id: String,
        output: String,
    },
}

/// Tool definition for the API request
#[derive(Serialize, Debug)]
struct ApiToolDefinition {
    #[serde(rename = "type")]
    tool_type: &'static str, // always "function"
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// The request body for the Responses API
#[derive(Serialize, Debug)]
struct ResponsesRequest {
    model: String,
    input: Vec<InputItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ApiToolDefinition>>,
}

/// Generic SSE event wrapper to extract the type field.
/// OpenRouter embeds the event type inside the JSON, not in SSE event: lines
#[derive(Deserialize, Debug)]
struct SseEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: String,
}

/// SSE event for response.output_item.added (detects function_call output items)
#[derive(Deserialize, Debug)]
struct OutputItemAddedEvent {
    item: OutputItemData,
}

#[derive(Deserialize, Debug)]
struct OutputItemData {
    #[serde(rename = "type")]
    item_type: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    call_id: String,
    #[serde(default)]
    name: String,
}

/// SSE event for response.function_call_arguments.done.
/// The `item_id` correlates back to the `output_item.added` event's `item.id`.
#[derive(Deserialize, Debug)]
struct FunctionCallArgsDoneEvent {
    item_id: String,
    #[serde(default)]
    name: String,
    arguments: String,
}

/// Tracks a tool call across multiple SSE events (added → delta* → done).
struct PendingToolCall {
    id: String,      // API object ID (e.g. "fc_abc123")
    call_id: String, // Correlation ID (e.g. "call_xyz789")
    name: String,
}

// ============================================================================
// Translation Layer
// ============================================================================

/// Converts context items into Responses API input format.
fn context_to_input(items: &[ContextItem]) -> Vec<InputItem> {
    let mut fco_counter = 0usize;
    items
        .iter()
        .map(|item| match item {
            ContextItem::Message(seg) => InputItem::Message {
                role: match seg.source {
                    Source::Directive => Role::System,
                    Source::User => Role::User,
                    Source::Model => Role::Assistant,
                },
                content: seg.content.clone(),
            },
            ContextItem::ToolCall(tc) => InputItem::FunctionCall {
                id: tc.id.clone(),
                call_id: tc.call_id.clone(),
                name: tc.name.clone(),
                arguments: tc.arguments.clone(),
            },
            ContextItem::ToolResult(tr) => {
                fco_counter += 1;
                InputItem::FunctionCallOutput {
                    id: format!("fco_{fco_counter}"),
                    call_id: tr.call_id.clone(),
                    output: tr.output.clone(),
                }
            }
        })
        .collect()
}

/// Converts tool definitions to API format. Returns None if empty (omitted from JSON).
fn tools_to_api(tools: &[ToolDefinition]) -> Option<Vec<ApiToolDefinition>> {
    if tools.is_empty() {
        return None;
    }
    Some(
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                tool_type: "function",
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect(),
    )
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// OpenRouter API provider using Responses API
pub struct OpenRouterProvider {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenRouterProvider {
    /// Creates a new OpenRouter provider.
    ///
    /// # Arguments
    /// * `api_key` - OpenRouter API key
    /// * `base_url` - Optional custom base URL (defaults to OpenRouter's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client: reqwest::Client::new(),
        }
    }

    /// Sends a request to the Responses endpoint and returns the response.
    async fn send_request(
        &self,
        request: &ResponsesRequest,
    ) -> Result<reqwest::Response, ProviderError> {
        let json_body = serde_json::to_string(request)
            .map_err(|e| ProviderError::Parse(format!("Request serialization failed: {e}")))?;
        debug!("Raw OpenRouter request: {}", json_body);

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .body(json_body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!("OpenRouter response status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let err_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            warn!("OpenRouter API error: {} - {}", status, err_body);
            return Err(ProviderError::Api {
                status,
                message: err_body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        // The Responses API is stateless, so the full context goes out every round.
        let responses_request = ResponsesRequest {
            model: request.model.to_string(),
            input: context_to_input(&request.context.items),
            stream: Some(true),
            temperature: request.temperature,
            max_output_tokens: request.max_output_tokens,
            tools: tools_to_api(request.tools),
        };

        info!(
            "OpenRouter Responses API request: model={}, input_count={}, tools={}",
            request.model,
            responses_request.input.len(),
            request.tools.len(),
        );

        let mut response = self.send_request(&responses_request).await?;

        // Raw bytes: a multi-byte character may be split across chunks
        let mut buffer: Vec<u8> = Vec::new();
        let mut current_event_type: Option<String> = None;
        let mut total_content_len = 0usize;
        let mut chunk_count = 0usize;

        // Tool call state: tracks concurrent tool calls by item_id
        let mut pending_tools: HashMap<String, PendingToolCall> = HashMap::new();

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?
        {
            buffer.extend_from_slice(&chunk);

            // Process complete lines from buffer
            while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = buffer.drain(..=pos).collect();
                let line = String::from_utf8_lossy(&raw).trim().to_string();

                if let Some(event_type) = line.strip_prefix("event: ") {
                    current_event_type = Some(event_type.to_string());
                    continue;
                }

                let Some(data) = line.strip_prefix("data: ") else {
                    continue;
                };
                if data == "[DONE]" {
                    debug!("Received [DONE] marker");
                    continue;
                }

                let event_type = current_event_type.take().or_else(|| {
                    serde_json::from_str::<SseEvent>(data)
                        .ok()
                        .map(|e| e.event_type)
                });

                match event_type.as_deref() {
                    Some("response.output_text.delta") => {
                        if let Ok(event) = serde_json::from_str::<SseEvent>(data)
                            && !event.delta.is_empty()
                        {
                            chunk_count += 1;
                            total_content_len += event.delta.len();
                            if sender.send(StreamChunk::Content(event.delta)).await.is_err() {
                                warn!("Content chunk send failed: receiver dropped");
                                return Err(ProviderError::ChannelClosed);
                            }
                        }
                    }
                    Some("response.output_item.added") => {
                        if let Ok(event) = serde_json::from_str::<OutputItemAddedEvent>(data)
                            && event.item.item_type == "function_call"
                        {
                            debug!(
                                "Tool call started: {} (item_id={}, call_id={})",
                                event.item.name, event.item.id, event.item.call_id
                            );
                            pending_tools.insert(
                                event.item.id.clone(),
                                PendingToolCall {
                                    id: event.item.id,
                                    call_id: event.item.call_id,
                                    name: event.item.name,
                                },
                            );
                        }
                    }
                    Some("response.function_call_arguments.done") => {
                        let event = serde_json::from_str::<FunctionCallArgsDoneEvent>(data)
                            .map_err(|e| {
                                ProviderError::Parse(format!("bad function_call_arguments.done: {e}"))
                            })?;
                        let Some(pending) = pending_tools.remove(&event.item_id) else {
                            warn!(
                                "arguments.done for unknown item_id: {}, skipping",
                                event.item_id
                            );
                            continue;
                        };
                        let name = if event.name.is_empty() { pending.name } else { event.name };
                        let tool_call = ToolCall {
                            id: pending.id,
                            call_id: pending.call_id,
                            name,
                            arguments: event.arguments,
                        };
                        debug!(
                            "Tool call complete: {} (call_id={})",
                            tool_call.name, tool_call.call_id
                        );
                        chunk_count += 1;
                        if sender.send(StreamChunk::ToolCall(tool_call)).await.is_err() {
                            warn!("ToolCall send failed: receiver dropped");
                            return Err(ProviderError::ChannelClosed);
                        }
                    }
                    Some("response.completed") => {
                        info!(
                            "Stream complete: {} chunks, {} content bytes",
                            chunk_count, total_content_len
                        );
                        if sender.send(StreamChunk::Completed).await.is_err() {
                            warn!("Completed send failed: receiver dropped");
                            return Err(ProviderError::ChannelClosed);
                        }
                        return Ok(());
                    }
                    Some(other) => {
                        // response.created, response.in_progress, argument deltas, ...
                        debug!("Ignoring event type '{}': {} bytes", other, data.len());
                    }
                    None => {
                        debug!("Could not parse event type from data: {}", data);
                    }
                }
            }
        }

        if !pending_tools.is_empty() {
            warn!(
                "Stream ended with {} unresolved tool call(s): {:?}",
                pending_tools.len(),
                pending_tools.keys().collect::<Vec<_>>()
            );
        }
        info!(
            "Stream ended: {} chunks processed, {} total content bytes",
            chunk_count, total_content_len
        );
        Ok(())
    }
}
