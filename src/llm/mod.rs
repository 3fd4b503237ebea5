use crate::message::{Message, ToolCall};
use crate::tool::ToolSpec;
use anyhow::Result;

mod claude;
mod scripted;

pub use claude::ClaudeProvider;
pub use scripted::{RecordedRequest, ScriptedProvider};

/// One request to a capability provider
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub system: &'a str,
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// Provider reply: text, tool calls, or both
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

impl ChatResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool_call(id: &str, name: &str, arguments: &str) -> Self {
        Self {
            content: String::new(),
            tool_calls: vec![ToolCall::new(id, name, arguments)],
        }
    }

    pub fn with_tool_call(mut self, id: &str, name: &str, arguments: &str) -> Self {
        self.tool_calls.push(ToolCall::new(id, name, arguments));
        self
    }
}

/// External text-generation service, invoked with a prompt, the history
/// and the tools the calling agent may use
#[async_trait::async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse>;
}
