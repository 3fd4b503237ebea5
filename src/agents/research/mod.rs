use super::react::ReactAgent;
use crate::llm::ChatProvider;
use crate::tool::Tool;
use std::sync::Arc;

pub mod search;

pub use search::{TavilyConfig, TavilySearch};

pub const RESEARCH_AGENT: &str = "research_agent";

pub const RESEARCH_PROMPT: &str = "You are a research agent.

INSTRUCTIONS:
- Assist ONLY with research-related tasks.
- Do not perform analysis, interpretation, or translation.
- After you're done with your tasks, respond to the supervisor directly
- Respond ONLY with the results of your work, do NOT include ANY other text.";

/// Research specialist; `search` is its only tool
pub fn research_agent(provider: Arc<dyn ChatProvider>, search: Box<dyn Tool>) -> ReactAgent {
    ReactAgent::new(RESEARCH_AGENT, RESEARCH_PROMPT, provider)
        .with_description("Finds information on the web.")
        .with_tools(vec![search])
}
