//! State graph of agent nodes sharing one conversation.
//!
//! Nodes are agents. Control enters at the single node connected to
//! [`START`], moves along fixed edges when an agent finishes, and follows
//! handoff [`Command`](crate::tool::Command)s otherwise. A node without a
//! fixed edge that finishes ends the run.

use crate::agent::Agent;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

mod mermaid;
mod run;

pub use run::NodeUpdate;

pub const START: &str = "__start__";
pub const END: &str = "__end__";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Node name already used: {0}")]
    DuplicateNode(String),

    #[error("Node name is reserved: {0}")]
    ReservedNodeName(String),

    #[error("Edge {from} -> {to} references an unknown node")]
    UnknownEdgeEndpoint { from: String, to: String },

    #[error("Edge {from} -> {to} is not allowed")]
    InvalidEdge { from: String, to: String },

    #[error("Graph has no entry point; add an edge from __start__")]
    MissingEntryPoint,

    #[error("Node {0} has more than one outgoing edge")]
    MultipleOutgoingEdges(String),

    #[error("Node {node} declares unknown destination {destination}")]
    UnknownDestination { node: String, destination: String },

    #[error("Node {node} can hand off to {target}, which is not a reachable node")]
    UndeclaredHandoff { node: String, target: String },

    #[error("Node {from} routed to {to}, which it may not reach")]
    InvalidRoute { from: String, to: String },

    #[error("Recursion limit of {0} steps reached without reaching __end__")]
    RecursionLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Maximum node executions per run
    pub recursion_limit: usize,
    /// Record a transfer-back exchange when a node follows a fixed edge
    pub handoff_back_messages: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 25,
            handoff_back_messages: false,
        }
    }
}

impl GraphConfig {
    pub fn new() -> Self {
        let defaults = Self::default();
        Self {
            recursion_limit: env_or("GRAPH_RECURSION_LIMIT", defaults.recursion_limit),
            handoff_back_messages: env_or(
                "GRAPH_HANDOFF_BACK_MESSAGES",
                defaults.handoff_back_messages,
            ),
        }
    }
}

/// Parse `key` from the environment, keeping `default` when it is unset or
/// unparseable
fn env_or<T: FromStr + std::fmt::Debug>(key: &str, default: T) -> T {
    let Ok(raw) = env::var(key) else {
        return default;
    };
    match parse_setting(&raw) {
        Some(value) => value,
        None => {
            log::warn!("Ignoring {}={:?}: not a valid value, using {:?}", key, raw, default);
            default
        }
    }
}

fn parse_setting<T: FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    raw.parse()
        .ok()
        .or_else(|| raw.to_ascii_lowercase().parse().ok())
}

struct NodeSpec {
    agent: Arc<dyn Agent>,
    /// Where a handoff from this node may go; `None` means anywhere
    destinations: Option<Vec<String>>,
}

/// Builder for a [`CompiledGraph`]
pub struct StateGraph {
    config: GraphConfig,
    nodes: Vec<(String, NodeSpec)>,
    edges: Vec<(String, String)>,
}

impl StateGraph {
    pub fn new(config: GraphConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Add an agent node named after the agent
    pub fn add_node(self, agent: impl Agent + 'static) -> Self {
        self.push_node(Arc::new(agent), None)
    }

    /// Add an agent node that may only hand off to `destinations`
    pub fn add_node_with_destinations(
        self,
        agent: impl Agent + 'static,
        destinations: &[&str],
    ) -> Self {
        let destinations = destinations.iter().map(|d| d.to_string()).collect();
        self.push_node(Arc::new(agent), Some(destinations))
    }

    fn push_node(mut self, agent: Arc<dyn Agent>, destinations: Option<Vec<String>>) -> Self {
        let name = agent.name().to_string();
        self.nodes.push((name, NodeSpec { agent, destinations }));
        self
    }

    /// Add a fixed edge taken whenever `from` finishes without a handoff
    pub fn add_edge(mut self, from: &str, to: &str) -> Self {
        self.edges.push((from.to_string(), to.to_string()));
        self
    }

    pub fn compile(self) -> Result<CompiledGraph, GraphError> {
        let mut order = Vec::new();
        let mut nodes = HashMap::new();
        for (name, spec) in self.nodes {
            if name == START || name == END {
                return Err(GraphError::ReservedNodeName(name));
            }
            if nodes.contains_key(&name) {
                return Err(GraphError::DuplicateNode(name));
            }
            order.push(name.clone());
            nodes.insert(name, spec);
        }

        let mut entry = None;
        let mut edges = HashMap::new();
        for (from, to) in self.edges {
            if from == END || to == START {
                return Err(GraphError::InvalidEdge { from, to });
            }
            let from_known = from == START || nodes.contains_key(&from);
            let to_known = to == END || nodes.contains_key(&to);
            if !from_known || !to_known {
                return Err(GraphError::UnknownEdgeEndpoint { from, to });
            }
            if from == START {
                if entry.is_some() {
                    return Err(GraphError::MultipleOutgoingEdges(from));
                }
                entry = Some(to);
                continue;
            }
            if edges.contains_key(&from) {
                return Err(GraphError::MultipleOutgoingEdges(from));
            }
            edges.insert(from, to);
        }
        let entry = entry.ok_or(GraphError::MissingEntryPoint)?;

        for name in &order {
            let spec = &nodes[name];
            if let Some(destinations) = &spec.destinations {
                for destination in destinations {
                    if destination != END && !nodes.contains_key(destination) {
                        return Err(GraphError::UnknownDestination {
                            node: name.clone(),
                            destination: destination.clone(),
                        });
                    }
                }
            }
            for target in spec.agent.handoff_targets() {
                let declared = spec
                    .destinations
                    .as_ref()
                    .map_or(true, |d| d.iter().any(|x| x == target));
                if !nodes.contains_key(target) || !declared {
                    return Err(GraphError::UndeclaredHandoff {
                        node: name.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        for name in &order {
            log::debug!("Graph node {}: {}", name, nodes[name].agent.description());
        }
        log::info!(
            "Compiled graph with {} nodes, entry point {}",
            order.len(),
            entry
        );

        Ok(CompiledGraph {
            config: self.config,
            order,
            nodes,
            edges,
            entry,
        })
    }
}

/// Validated graph, ready to run
pub struct CompiledGraph {
    config: GraphConfig,
    order: Vec<String>,
    nodes: HashMap<String, NodeSpec>,
    edges: HashMap<String, String>,
    entry: String,
}

impl CompiledGraph {
    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node names in insertion order
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|n| n.as_str())
    }

    /// Fixed edge out of `node`
    pub fn next_fixed(&self, node: &str) -> Option<&str> {
        self.edges.get(node).map(|n| n.as_str())
    }

    /// Declared handoff destinations of `node`, or the targets of its
    /// handoff tools when none were declared
    pub fn destinations(&self, node: &str) -> Vec<&str> {
        match self.nodes.get(node) {
            Some(NodeSpec {
                destinations: Some(destinations),
                ..
            }) => destinations.iter().map(|d| d.as_str()).collect(),
            Some(spec) => spec.agent.handoff_targets(),
            None => Vec::new(),
        }
    }

    fn can_route(&self, from: &str, to: &str) -> bool {
        let Some(spec) = self.nodes.get(from) else {
            return false;
        };
        match &spec.destinations {
            Some(destinations) => destinations.iter().any(|d| d == to),
            None => to == END || self.nodes.contains_key(to),
        }
    }

    fn agent(&self, node: &str) -> Option<&Arc<dyn Agent>> {
        self.nodes.get(node).map(|spec| &spec.agent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{create_handoff_tool, ReactAgent};
    use crate::llm::ScriptedProvider;

    fn worker(name: &str) -> ReactAgent {
        ReactAgent::new(name, "prompt", Arc::new(ScriptedProvider::new(name, vec![])))
    }

    fn router(name: &str, targets: &[&str]) -> ReactAgent {
        let tools = targets
            .iter()
            .map(|t| Box::new(create_handoff_tool(t, None)) as Box<dyn crate::tool::Tool>)
            .collect();
        worker(name).with_tools(tools)
    }

    fn compile_err(graph: StateGraph) -> GraphError {
        match graph.compile() {
            Ok(_) => panic!("graph should not compile"),
            Err(e) => e,
        }
    }

    #[test]
    fn compiles_supervisor_topology() {
        let graph = StateGraph::new(GraphConfig::default())
            .add_node_with_destinations(router("boss", &["a", "b"]), &["a", "b", END])
            .add_node(worker("a"))
            .add_node(worker("b"))
            .add_edge(START, "boss")
            .add_edge("a", "boss")
            .add_edge("b", "boss")
            .compile()
            .unwrap();

        assert_eq!(graph.entry(), "boss");
        assert_eq!(graph.next_fixed("a"), Some("boss"));
        assert_eq!(graph.next_fixed("boss"), None);
        assert_eq!(graph.destinations("boss"), vec!["a", "b", END]);
        assert_eq!(graph.node_names().collect::<Vec<_>>(), vec!["boss", "a", "b"]);
    }

    #[test]
    fn undeclared_destinations_follow_handoff_tools() {
        let graph = StateGraph::new(GraphConfig::default())
            .add_node(router("boss", &["a"]))
            .add_node(worker("a"))
            .add_edge(START, "boss")
            .compile()
            .unwrap();

        assert_eq!(graph.destinations("boss"), vec!["a"]);
        assert!(graph.destinations("a").is_empty());
        assert!(graph.destinations("ghost").is_empty());
    }

    #[test]
    fn transfer_back_is_off_by_default() {
        assert!(!GraphConfig::default().handoff_back_messages);
        assert_eq!(GraphConfig::default().recursion_limit, 25);
    }

    #[test]
    fn settings_parse_case_insensitively() {
        assert_eq!(parse_setting::<bool>("False"), Some(false));
        assert_eq!(parse_setting::<bool>(" TRUE "), Some(true));
        assert_eq!(parse_setting::<usize>("40"), Some(40));
        assert_eq!(parse_setting::<usize>("forty"), None);
        assert_eq!(parse_setting::<bool>("yes"), None);
    }

    #[test]
    fn unparseable_setting_keeps_default() {
        std::env::set_var("GRAPH_TEST_UNPARSEABLE_LIMIT", "lots");
        assert_eq!(env_or("GRAPH_TEST_UNPARSEABLE_LIMIT", 25usize), 25);
        std::env::remove_var("GRAPH_TEST_UNPARSEABLE_LIMIT");
        assert_eq!(env_or("GRAPH_TEST_UNSET_LIMIT", 7usize), 7);
    }

    #[test]
    fn handoff_to_missing_node_fails_at_compile_time() {
        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(router("boss", &["ghost"]))
                .add_edge(START, "boss"),
        );
        assert_eq!(
            err,
            GraphError::UndeclaredHandoff {
                node: "boss".into(),
                target: "ghost".into()
            }
        );
    }

    #[test]
    fn handoff_outside_declared_destinations_fails() {
        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node_with_destinations(router("boss", &["a", "b"]), &["a", END])
                .add_node(worker("a"))
                .add_node(worker("b"))
                .add_edge(START, "boss"),
        );
        assert!(matches!(err, GraphError::UndeclaredHandoff { target, .. } if target == "b"));
    }

    #[test]
    fn rejects_structural_mistakes() {
        let err = compile_err(StateGraph::new(GraphConfig::default()).add_node(worker("a")));
        assert_eq!(err, GraphError::MissingEntryPoint);

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(worker("a"))
                .add_node(worker("a"))
                .add_edge(START, "a"),
        );
        assert_eq!(err, GraphError::DuplicateNode("a".into()));

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(worker(END))
                .add_edge(START, END),
        );
        assert_eq!(err, GraphError::ReservedNodeName(END.into()));

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(worker("a"))
                .add_edge(START, "a")
                .add_edge("a", "nowhere"),
        );
        assert!(matches!(err, GraphError::UnknownEdgeEndpoint { .. }));

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(worker("a"))
                .add_node(worker("b"))
                .add_edge(START, "a")
                .add_edge("a", "b")
                .add_edge("a", END),
        );
        assert_eq!(err, GraphError::MultipleOutgoingEdges("a".into()));

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node(worker("a"))
                .add_edge(START, "a")
                .add_edge(END, "a"),
        );
        assert!(matches!(err, GraphError::InvalidEdge { .. }));

        let err = compile_err(
            StateGraph::new(GraphConfig::default())
                .add_node_with_destinations(worker("a"), &["z"])
                .add_edge(START, "a"),
        );
        assert!(matches!(err, GraphError::UnknownDestination { .. }));
    }
}
