pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CompletionProvider, CompletionRequest, ProviderError};
pub use providers::OpenRouterProvider;
pub use types::{Context, ContextItem, ContextSegment, Source, StreamChunk, ToolCall, ToolDefinition, ToolResult};
