//! # Agent Loop
//!
//! Answers one question at a time:
//!
//! ```text
//!  system prompt + question
//!          │
//!          ▼
//!   ┌──────────────┐  Content ──► sink (streamed to the user)
//!   │   provider   │  ToolCall ─► registry.execute() ─► ToolResult
//!   └──────┬───────┘                                       │
//!          └──────────── next round with results ◄─────────┘
//! ```
//!
//! A round is one provider request plus the tool calls it produced. The loop
//! ends on the first round without tool calls, or fails once
//! `max_rounds` rounds have all asked for tools.

use std::fmt;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::core::config::ResolvedConfig;
use crate::core::tools::ToolRegistry;
use crate::inference::{
    CompletionProvider, CompletionRequest, Context, ProviderError, StreamChunk, ToolCall,
    ToolResult,
};

#[derive(Debug)]
pub enum AgentError {
    Provider(ProviderError),
    RoundLimit { rounds: u8 },
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::Provider(e) => write!(f, "{e}"),
            AgentError::RoundLimit { rounds } => write!(
                f,
                "no final answer after {rounds} rounds of tool calls"
            ),
        }
    }
}

impl std::error::Error for AgentError {}

impl From<ProviderError> for AgentError {
    fn from(e: ProviderError) -> Self {
        AgentError::Provider(e)
    }
}

/// Model parameters for every request the agent makes.
#[derive(Debug, Clone)]
pub struct AgentSettings {
    pub model: String,
    pub temperature: f32,
    pub max_rounds: u8,
    pub max_output_tokens: u32,
    pub system_prompt: String,
}

impl From<&ResolvedConfig> for AgentSettings {
    fn from(config: &ResolvedConfig) -> Self {
        Self {
            model: config.model_name.clone(),
            temperature: config.temperature,
            max_rounds: config.max_agentic_rounds,
            max_output_tokens: config.max_output_tokens,
            system_prompt: config.system_prompt.clone(),
        }
    }
}

pub struct Agent {
    provider: Arc<dyn CompletionProvider>,
    registry: Arc<ToolRegistry>,
    settings: AgentSettings,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        registry: Arc<ToolRegistry>,
        settings: AgentSettings,
    ) -> Self {
        Self {
            provider,
            registry,
            settings,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Answers `question` in a fresh context, streaming text into `sink`.
    ///
    /// Returns the full answer text (everything that went to `sink`).
    pub async fn answer<F>(&self, question: &str, mut sink: F) -> Result<String, AgentError>
    where
        F: FnMut(&str) + Send,
    {
        info!(
            "Answering question ({} chars) with {} via {}",
            question.len(),
            self.settings.model,
            self.provider.name()
        );

        let mut context = Context::with_directive(self.settings.system_prompt.clone());
        context.add_user_message(question.to_string());
        let tools = self.registry.definitions();
        let mut answer = String::new();

        for round in 1..=self.settings.max_rounds {
            let (text, tool_calls) = self.run_round(&context, &tools, &mut sink).await?;
            debug!(
                "Round {}: {} content bytes, {} tool calls",
                round,
                text.len(),
                tool_calls.len()
            );

            if !text.is_empty() {
                context.append_to_last_model_message(&text);
                answer.push_str(&text);
            }

            if tool_calls.is_empty() {
                info!("Answer complete after {} round(s)", round);
                return Ok(answer);
            }

            for tool_call in tool_calls {
                let output = self.registry.execute(&tool_call);
                let call_id = tool_call.call_id.clone();
                context.add_tool_call(tool_call);
                context.add_tool_result(ToolResult { call_id, output });
            }
        }

        warn!(
            "Round limit reached ({}) while the model was still calling tools",
            self.settings.max_rounds
        );
        Err(AgentError::RoundLimit {
            rounds: self.settings.max_rounds,
        })
    }

    /// One provider request; content is forwarded to `sink` as it arrives.
    async fn run_round<F>(
        &self,
        context: &Context,
        tools: &[crate::inference::ToolDefinition],
        sink: &mut F,
    ) -> Result<(String, Vec<ToolCall>), AgentError>
    where
        F: FnMut(&str) + Send,
    {
        let (chunk_tx, mut chunk_rx) = mpsc::channel::<StreamChunk>(100);

        let request = CompletionRequest {
            context,
            model: &self.settings.model,
            tools,
            temperature: self.settings.temperature,
            max_output_tokens: Some(self.settings.max_output_tokens),
        };

        let stream = self.provider.stream_completion(request, chunk_tx);

        let collect = async {
            let mut text = String::new();
            let mut tool_calls = Vec::new();
            while let Some(chunk) = chunk_rx.recv().await {
                match chunk {
                    StreamChunk::Content(delta) => {
                        sink(&delta);
                        text.push_str(&delta);
                    }
                    StreamChunk::ToolCall(tc) => {
                        debug!("Received tool call: {} (call_id={})", tc.name, tc.call_id);
                        tool_calls.push(tc);
                    }
                    StreamChunk::Completed => debug!("Stream completed"),
                }
            }
            (text, tool_calls)
        };

        let (result, collected) = tokio::join!(stream, collect);
        result?;
        Ok(collected)
    }
}
