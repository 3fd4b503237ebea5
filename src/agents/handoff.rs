use crate::message::Message;
use crate::tool::{Command, CommandGraph, Tool, ToolContext, ToolOutput};
use anyhow::Result;
use serde_json::{json, Value};

/// Tool that moves control to another node of the enclosing graph
pub struct HandoffTool {
    name: String,
    description: String,
    agent_name: String,
}

/// Build the `transfer_to_<agent_name>` tool.
///
/// Executing it appends an acknowledgement for the originating call to the
/// caller's state and returns a [`Command`] that the parent graph resolves
/// by resuming at `agent_name`. Whether that node exists is checked when
/// the graph is compiled.
pub fn create_handoff_tool(agent_name: &str, description: Option<&str>) -> HandoffTool {
    HandoffTool {
        name: format!("transfer_to_{}", agent_name),
        description: description
            .map(str::to_string)
            .unwrap_or_else(|| format!("Ask {} for help.", agent_name)),
        agent_name: agent_name.to_string(),
    }
}

#[async_trait::async_trait]
impl Tool for HandoffTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    fn handoff_target(&self) -> Option<&str> {
        Some(self.agent_name.as_str())
    }

    async fn execute(&self, _arguments: &str, ctx: ToolContext<'_>) -> Result<ToolOutput> {
        let tool_message = Message::tool(
            format!("Successfully transferred to {}", self.agent_name),
            &self.name,
            ctx.tool_call_id,
        );

        let mut update = ctx.state.clone();
        update.push(tool_message);

        Ok(ToolOutput::Command(Command {
            goto: self.agent_name.clone(),
            update,
            graph: CommandGraph::Parent,
        }))
    }
}
