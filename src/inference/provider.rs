//! The seam between the agent loop and a hosted model.
//!
//! A provider turns one [`CompletionRequest`] into a stream of
//! [`StreamChunk`]s. The agent owns the receiving end and decides what to do
//! with text and tool calls as they arrive.

use std::fmt;

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use super::types::{Context, StreamChunk, ToolDefinition};

/// Why a completion request produced no (or only part of an) answer.
///
/// The agent surfaces these to the user as-is; nothing is retried.
#[derive(Debug)]
pub enum ProviderError {
    /// Missing API key or unusable base URL.
    Config(String),
    /// The HTTP request never completed.
    Network(String),
    /// Non-success status; `message` is the response body.
    Api { status: u16, message: String },
    /// An event in the stream could not be decoded.
    Parse(String),
    /// The agent stopped listening before the stream ended.
    ChannelClosed,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Config(msg) => write!(f, "config error: {msg}"),
            ProviderError::Network(msg) => write!(f, "network error: {msg}"),
            ProviderError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            ProviderError::Parse(msg) => write!(f, "parse error: {msg}"),
            ProviderError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One round of the tool loop: the question so far plus the math catalog.
pub struct CompletionRequest<'a> {
    pub context: &'a Context,
    pub model: &'a str,
    pub tools: &'a [ToolDefinition],
    pub temperature: f32,
    /// `None` leaves the limit to the provider.
    pub max_output_tokens: Option<u32>,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Sends text deltas and finished tool calls to `sender`, ending with
    /// [`StreamChunk::Completed`] when the model is done.
    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError>;
}
