//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc::Sender;

use crate::core::agent::{Agent, AgentSettings};
use crate::core::tools::default_registry;
use crate::inference::{
    CompletionProvider, CompletionRequest, Context, ProviderError, StreamChunk, ToolCall,
};

enum Step {
    Round(Vec<StreamChunk>),
    Fail(ProviderError),
}

/// Replays a fixed script of rounds and records every request it receives.
///
/// Once the script runs out each request completes with no output.
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<Step>>,
    contexts: Mutex<Vec<Context>>,
    tool_counts: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    pub fn new(rounds: Vec<Vec<StreamChunk>>) -> Self {
        Self::from_steps(rounds.into_iter().map(Step::Round).collect())
    }

    /// A provider whose first request fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::from_steps(VecDeque::from([Step::Fail(error)]))
    }

    fn from_steps(steps: VecDeque<Step>) -> Self {
        Self {
            steps: Mutex::new(steps),
            contexts: Mutex::new(Vec::new()),
            tool_counts: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the context sent with each request, in order.
    pub fn contexts(&self) -> Vec<Context> {
        self.contexts.lock().unwrap().clone()
    }

    /// Number of tool definitions sent with each request.
    pub fn tool_counts(&self) -> Vec<usize> {
        self.tool_counts.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.contexts.lock().unwrap().len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest<'_>,
        sender: Sender<StreamChunk>,
    ) -> Result<(), ProviderError> {
        self.contexts.lock().unwrap().push(request.context.clone());
        self.tool_counts.lock().unwrap().push(request.tools.len());

        let step = self.steps.lock().unwrap().pop_front();
        let chunks = match step {
            Some(Step::Round(chunks)) => chunks,
            Some(Step::Fail(error)) => return Err(error),
            None => vec![StreamChunk::Completed],
        };
        for chunk in chunks {
            sender.send(chunk).await.map_err(|_| ProviderError::ChannelClosed)?;
        }
        Ok(())
    }
}

/// A round that streams `deltas` and completes.
pub fn text_round(deltas: &[&str]) -> Vec<StreamChunk> {
    deltas
        .iter()
        .map(|d| StreamChunk::Content(d.to_string()))
        .chain(std::iter::once(StreamChunk::Completed))
        .collect()
}

/// A round that asks for a single tool call.
pub fn tool_round(name: &str, arguments: &str) -> Vec<StreamChunk> {
    vec![
        StreamChunk::ToolCall(ToolCall {
            id: format!("fc_{name}"),
            call_id: format!("call_{name}"),
            name: name.to_string(),
            arguments: arguments.to_string(),
        }),
        StreamChunk::Completed,
    ]
}

/// An agent over the full catalog backed by `provider`.
pub fn test_agent(provider: Arc<ScriptedProvider>) -> Agent {
    let registry = default_registry().expect("default catalog builds");
    Agent::new(
        provider,
        Arc::new(registry),
        AgentSettings {
            model: "test-model".to_string(),
            temperature: 0.0,
            max_rounds: 5,
            max_output_tokens: 256,
            system_prompt: "You are a math tutor.".to_string(),
        },
    )
}
