use crate::message::MessagesState;
use crate::tool::Command;
use anyhow::Result;

/// How an agent's turn ended
#[derive(Debug, Clone, PartialEq)]
pub enum AgentTurn {
    /// Answered without asking for a transfer; carries the full history
    Finished(MessagesState),
    /// A handoff tool asked the enclosing graph to move on
    Handoff(Command),
}

impl AgentTurn {
    pub fn state(&self) -> &MessagesState {
        match self {
            AgentTurn::Finished(state) => state,
            AgentTurn::Handoff(command) => &command.update,
        }
    }
}

/// Core trait that all agents must implement
/// Agents answer from the shared conversation or hand control to another node
#[async_trait::async_trait]
pub trait Agent: Send + Sync {
    /// Get the name of the agent, which is also its node name
    fn name(&self) -> &str;

    /// Get the description of what this agent handles
    fn description(&self) -> &str;

    /// Nodes this agent can transfer control to
    fn handoff_targets(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Entry point for agent execution with logging
    async fn call(&self, state: &MessagesState) -> Result<AgentTurn> {
        log::info!(
            "Agent call start: {} - {} messages in state",
            self.name(),
            state.len()
        );

        let result = self.execute(state).await;

        match &result {
            Ok(AgentTurn::Finished(next)) => log::info!(
                "Agent call success: {} - response: {}",
                self.name(),
                next.last().map(|m| m.content.as_str()).unwrap_or("")
            ),
            Ok(AgentTurn::Handoff(command)) => log::info!(
                "Agent call success: {} - handing off to {}",
                self.name(),
                command.goto
            ),
            Err(e) => log::error!("Agent call error: {} - error: {}", self.name(), e),
        }

        result
    }

    /// Actual implementation of the agent execution
    async fn execute(&self, state: &MessagesState) -> Result<AgentTurn>;
}
