// Re-export Agent trait from main agent module
pub use crate::agent::{Agent, AgentTurn};

// Agent implementation modules
pub mod analysis;
pub mod handoff;
pub mod react;
pub mod research;
pub mod supervisor;
pub mod translation;

// Re-export agent constructors
pub use analysis::{analysis_agent, ANALYSIS_AGENT};
pub use handoff::{create_handoff_tool, HandoffTool};
pub use react::ReactAgent;
pub use research::{research_agent, TavilySearch, RESEARCH_AGENT};
pub use supervisor::{supervisor_agent, SUPERVISOR};
pub use translation::{translation_agent, TRANSLATION_AGENT};
