use crate::agent::{Agent, AgentTurn};
use crate::llm::{ChatProvider, ChatRequest};
use crate::message::{Message, MessagesState};
use crate::tool::{tool_specs, Command, CommandGraph, Tool, ToolContext, ToolOutput};
use anyhow::Result;
use std::sync::Arc;

/// Upper bound on the size of a tool result kept in the conversation
pub const TOOL_OUTPUT_LIMIT: usize = 30000;

pub const DEFAULT_MAX_ROUNDS: usize = 25;

/// Provider bound to a fixed prompt and tool set, looping over tool calls
/// until the model answers or a handoff tool transfers control
pub struct ReactAgent {
    name: String,
    description: String,
    prompt: String,
    tools: Vec<Box<dyn Tool>>,
    provider: Arc<dyn ChatProvider>,
    max_rounds: usize,
}

impl ReactAgent {
    pub fn new(name: &str, prompt: &str, provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            name: name.to_string(),
            description: String::new(),
            prompt: prompt.to_string(),
            tools: Vec::new(),
            provider,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_tools(mut self, tools: Vec<Box<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    fn find_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }
}

#[async_trait::async_trait]
impl Agent for ReactAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn handoff_targets(&self) -> Vec<&str> {
        self.tools.iter().filter_map(|t| t.handoff_target()).collect()
    }

    async fn execute(&self, state: &MessagesState) -> Result<AgentTurn> {
        let specs = tool_specs(&self.tools);
        let mut working = state.clone();
        let mut round = 0;

        loop {
            round += 1;
            if round > self.max_rounds {
                log::warn!("{} reached maximum rounds: {}", self.name, self.max_rounds);
                return Err(anyhow::anyhow!(
                    "Agent {} exceeded {} rounds without finishing",
                    self.name,
                    self.max_rounds
                ));
            }

            log::debug!("{} calling provider - Round {}", self.name, round);

            let response = self
                .provider
                .complete(ChatRequest {
                    system: &self.prompt,
                    messages: working.messages(),
                    tools: &specs,
                })
                .await?;

            let tool_calls = response.tool_calls.clone();
            working.push(
                Message::assistant(response.content)
                    .with_name(&self.name)
                    .with_tool_calls(response.tool_calls),
            );

            if tool_calls.is_empty() {
                return Ok(AgentTurn::Finished(working));
            }

            let mut handoff: Option<Command> = None;

            for call in &tool_calls {
                if let Some(command) = &handoff {
                    working.push(Message::tool(
                        format!(
                            "Not executed: control was already transferred to {}",
                            command.goto
                        ),
                        &call.name,
                        &call.id,
                    ));
                    continue;
                }

                let Some(tool) = self.find_tool(&call.name) else {
                    log::error!("{} requested unknown tool {}", self.name, call.name);
                    working.push(Message::tool(
                        format!("Tool not found: {}", call.name),
                        &call.name,
                        &call.id,
                    ));
                    continue;
                };

                let ctx = ToolContext {
                    state: &working,
                    tool_call_id: &call.id,
                };
                match tool.call(&call.arguments, ctx).await? {
                    ToolOutput::Content(result) => {
                        working.push(Message::tool(
                            truncate_content(&result),
                            &call.name,
                            &call.id,
                        ));
                    }
                    ToolOutput::Command(mut command) => {
                        if command.graph == CommandGraph::Current {
                            return Err(anyhow::anyhow!(
                                "Tool {} issued a command for agent {}, which has no inner graph",
                                call.name,
                                self.name
                            ));
                        }
                        working.merge(std::mem::take(&mut command.update))?;
                        handoff = Some(command);
                    }
                }
            }

            if let Some(mut command) = handoff {
                command.update = working;
                return Ok(AgentTurn::Handoff(command));
            }
        }
    }
}

/// Truncate content to stay within limits, on a char boundary
pub fn truncate_content(content: &str) -> String {
    if content.len() <= TOOL_OUTPUT_LIMIT {
        return content.to_string();
    }

    let mut end = TOOL_OUTPUT_LIMIT;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    format!(
        "{}... [TRUNCATED - {} total chars]",
        &content[..end],
        content.len()
    )
}
