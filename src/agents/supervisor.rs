use super::analysis::ANALYSIS_AGENT;
use super::handoff::create_handoff_tool;
use super::react::ReactAgent;
use super::research::RESEARCH_AGENT;
use super::translation::TRANSLATION_AGENT;
use crate::llm::ChatProvider;
use crate::tool::Tool;
use std::sync::Arc;

pub const SUPERVISOR: &str = "supervisor";

// Translation-after-analysis ordering is only asked for here; nothing in
// the graph enforces it.
pub const SUPERVISOR_PROMPT: &str = "You are a supervisor managing three agents:
- a research agent. Assign research-related tasks to this agent
- a analysis agent. Assign analysis-related tasks to this agent
- a translation agent. Responsible for translating only the outputs provided by the analysis agent after analysis is complete.
Assign work to one agent at a time, do not call agents in parallel.
Do not do any work yourself.";

/// The three handoff tools, one per specialist
pub fn supervisor_tools() -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(create_handoff_tool(
            RESEARCH_AGENT,
            Some("Assign task to a researcher agent."),
        )),
        Box::new(create_handoff_tool(
            ANALYSIS_AGENT,
            Some("Assign task to an analysis agent."),
        )),
        Box::new(create_handoff_tool(
            TRANSLATION_AGENT,
            Some("Assign task to a translation agent."),
        )),
    ]
}

/// Routing agent; its only tools are handoffs
pub fn supervisor_agent(provider: Arc<dyn ChatProvider>) -> ReactAgent {
    ReactAgent::new(SUPERVISOR, SUPERVISOR_PROMPT, provider)
        .with_description("Routes work between the research, analysis and translation agents.")
        .with_tools(supervisor_tools())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::llm::ScriptedProvider;

    #[test]
    fn only_handoff_tools() {
        let agent = supervisor_agent(Arc::new(ScriptedProvider::new("s", vec![])));
        assert_eq!(
            agent.tool_names(),
            vec![
                "transfer_to_research_agent",
                "transfer_to_analysis_agent",
                "transfer_to_translation_agent"
            ]
        );
        assert_eq!(
            agent.handoff_targets(),
            vec![RESEARCH_AGENT, ANALYSIS_AGENT, TRANSLATION_AGENT]
        );
    }

    #[test]
    fn prompt_forbids_parallel_work() {
        assert!(SUPERVISOR_PROMPT.contains("one agent at a time"));
        assert!(SUPERVISOR_PROMPT.contains("Do not do any work yourself."));
    }
}
