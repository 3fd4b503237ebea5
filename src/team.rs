use crate::agents::{
    analysis_agent, research_agent, supervisor_agent, translation_agent, TavilySearch,
    ANALYSIS_AGENT, RESEARCH_AGENT, SUPERVISOR, TRANSLATION_AGENT,
};
use crate::graph::{CompiledGraph, GraphConfig, GraphError, StateGraph, END, START};
use crate::llm::{ChatProvider, ClaudeProvider};
use crate::tool::Tool;
use anyhow::Result;
use std::sync::Arc;

/// Capability provider for each agent of the team
#[derive(Clone)]
pub struct TeamProviders {
    pub supervisor: Arc<dyn ChatProvider>,
    pub research: Arc<dyn ChatProvider>,
    pub analysis: Arc<dyn ChatProvider>,
    pub translation: Arc<dyn ChatProvider>,
}

impl TeamProviders {
    /// Same provider for every agent
    pub fn shared(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            supervisor: provider.clone(),
            research: provider.clone(),
            analysis: provider.clone(),
            translation: provider,
        }
    }
}

/// Supervisor plus research, analysis and translation specialists.
///
/// The supervisor is the entry point and the only node that can end the
/// run; every specialist returns to it over a fixed edge.
pub fn build_team_graph(
    providers: TeamProviders,
    search: Box<dyn Tool>,
    config: GraphConfig,
) -> Result<CompiledGraph, GraphError> {
    StateGraph::new(config)
        .add_node_with_destinations(
            supervisor_agent(providers.supervisor),
            &[RESEARCH_AGENT, ANALYSIS_AGENT, TRANSLATION_AGENT, END],
        )
        .add_node(research_agent(providers.research, search))
        .add_node(analysis_agent(providers.analysis))
        .add_node(translation_agent(providers.translation))
        .add_edge(START, SUPERVISOR)
        .add_edge(RESEARCH_AGENT, SUPERVISOR)
        .add_edge(ANALYSIS_AGENT, SUPERVISOR)
        .add_edge(TRANSLATION_AGENT, SUPERVISOR)
        .compile()
}

/// Team backed by Claude and Tavily, configured from the environment
pub fn build_team_from_env() -> Result<CompiledGraph> {
    let provider: Arc<dyn ChatProvider> = Arc::new(ClaudeProvider::new()?);
    let search = Box::new(TavilySearch::new()?);
    let graph = build_team_graph(TeamProviders::shared(provider), search, GraphConfig::new())?;
    Ok(graph)
}
