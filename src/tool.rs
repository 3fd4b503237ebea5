use crate::message::MessagesState;
use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

/// Which graph resolves a [`Command`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGraph {
    /// The graph the agent itself runs in
    Current,
    /// The graph that contains the agent as a node
    Parent,
}

/// Control directive returned by a tool instead of data
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Node to resume at
    pub goto: String,
    /// Full conversation to continue with
    pub update: MessagesState,
    pub graph: CommandGraph,
}

/// Result of a tool execution
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    Content(String),
    Command(Command),
}

/// Values injected by the agent loop into every tool execution
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// Conversation as seen by the calling agent, including its tool call
    pub state: &'a MessagesState,
    /// Id of the call being answered
    pub tool_call_id: &'a str,
}

/// Descriptor handed to the capability provider
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Core Tool trait that all tools must implement
/// This is used by all agents across the system
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the name of the tool
    fn name(&self) -> &str;

    /// Get the description of the tool
    fn description(&self) -> &str;

    /// Get the parameters schema for the tool
    fn parameters(&self) -> Value;

    /// Node this tool transfers control to, if it is a handoff tool
    fn handoff_target(&self) -> Option<&str> {
        None
    }

    /// Entry point for tool execution with logging
    async fn call(&self, arguments: &str, ctx: ToolContext<'_>) -> Result<ToolOutput> {
        log::info!("Tool call start: {} - args: {}", self.name(), arguments);

        let result = self.execute(arguments, ctx).await;

        match &result {
            Ok(ToolOutput::Content(response)) => log::info!(
                "Tool call success: {} - response: {}",
                self.name(),
                response
            ),
            Ok(ToolOutput::Command(command)) => log::info!(
                "Tool call success: {} - goto: {}",
                self.name(),
                command.goto
            ),
            Err(e) => log::error!("Tool call error: {} - error: {}", self.name(), e),
        }

        result
    }

    /// Actual implementation of the tool execution
    async fn execute(&self, arguments: &str, ctx: ToolContext<'_>) -> Result<ToolOutput>;
}

/// Helper function to describe tools for the capability provider
pub fn tool_specs(tools: &[Box<dyn Tool>]) -> Vec<ToolSpec> {
    tools
        .iter()
        .map(|tool| ToolSpec {
            name: tool.name().to_string(),
            description: tool.description().to_string(),
            input_schema: tool.parameters(),
        })
        .collect()
}
