use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum Source {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Model,
    #[serde(rename = "system")]
    Directive,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ContextSegment {
    #[serde(rename = "role")]
    pub source: Source,
    pub content: String,
}

/// Helper function to replace typographic characters with ASCII equivalents.
fn replace_typography(text: &str) -> String {
    text.replace(['‘', '’'], "'") // Single quotes
        .replace(['“', '”'], "\"") // Double quotes
        .replace('—', "--") // Em dash
        .replace('…', "...") // Ellipsis
}

/// A single item in the context: a message, a tool call, or a tool result.
/// The Responses API input array is polymorphic; this enum mirrors that structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ContextItem {
    Message(ContextSegment),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// The model input for one question: system directive, the question, and
/// every tool round-trip the agent has made while answering it.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct Context {
    pub items: Vec<ContextItem>,
}

impl Context {
    /// Creates a Context that starts with the given system directive.
    pub fn with_directive(directive: impl Into<String>) -> Self {
        Context {
            items: vec![ContextItem::Message(ContextSegment {
                source: Source::Directive,
                content: directive.into(),
            })],
        }
    }

    /// Adds a new ContextSegment (wrapped in ContextItem::Message) and returns a reference to it.
    pub fn add(&mut self, segment: ContextSegment) -> &ContextSegment {
        self.items.push(ContextItem::Message(segment));
        match self.items.last() {
            Some(ContextItem::Message(seg)) => seg,
            _ => unreachable!(),
        }
    }

    pub fn add_user_message(&mut self, content: String) -> &ContextSegment {
        self.add(ContextSegment {
            source: Source::User,
            content,
        })
    }

    pub fn add_tool_call(&mut self, tc: ToolCall) {
        self.items.push(ContextItem::ToolCall(tc));
    }

    pub fn add_tool_result(&mut self, tr: ToolResult) {
        self.items.push(ContextItem::ToolResult(tr));
    }

    /// Appends content to the last message if it is from the model.
    /// If the last message is not from the model, creates a new one.
    pub fn append_to_last_model_message(&mut self, content: &str) {
        let normalized = replace_typography(content);

        if let Some(ContextItem::Message(seg)) = self.items.last_mut()
            && seg.source == Source::Model
        {
            seg.content.push_str(&normalized);
            return;
        }

        self.add(ContextSegment {
            source: Source::Model,
            content: normalized,
        });
    }
}

/// A tool the model can call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value, // JSON Schema
}

/// A completed tool call from the model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,       // API object ID (e.g. "fc_abc123"), needed for input array roundtrip
    pub call_id: String,  // Correlation ID (e.g. "call_xyz789"), links call to result
    pub name: String,
    pub arguments: String, // JSON string
}

/// Result of executing a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub call_id: String, // Matches ToolCall.call_id
    pub output: String,
}

/// Represents a chunk of streamed content from the model.
#[derive(Debug, PartialEq)]
pub enum StreamChunk {
    Content(String),
    ToolCall(ToolCall), // Complete tool call (arguments buffered by provider)
    Completed,
}
