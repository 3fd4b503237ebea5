use super::react::ReactAgent;
use crate::llm::ChatProvider;
use std::sync::Arc;

pub const ANALYSIS_AGENT: &str = "analysis_agent";

pub const ANALYSIS_PROMPT: &str = "You are an analysis agent.

INSTRUCTIONS:
- Your role is to analyze and summarize information collected by the research agent.
- Focus on extracting key insights, comparing data points, identifying trends or contradictions.
- Respond ONLY with your analytical conclusions, do NOT include any extra commentary or explanations.
- Do not perform translation.
- After you're done, respond directly to the supervisor.";

/// Analysis specialist; works only from the conversation so far
pub fn analysis_agent(provider: Arc<dyn ChatProvider>) -> ReactAgent {
    ReactAgent::new(ANALYSIS_AGENT, ANALYSIS_PROMPT, provider)
        .with_description("Analyzes and summarizes research findings.")
}
