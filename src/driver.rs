use crate::agents::SUPERVISOR;
use crate::graph::{CompiledGraph, NodeUpdate};
use crate::message::MessagesState;
use crate::utils;
use anyhow::Result;
use futures::TryStreamExt;
use std::fs;
use std::path::{Path, PathBuf};

/// Query used when none is given on the command line
pub const EXAMPLE_QUERY: &str = "Please find recent applications of AI in education. Then analyze the main benefits. Finally, translate your analysis into Chinese.";

/// Outcome of one driven run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub updates: Vec<NodeUpdate>,
    /// Messages of the supervisor's last snapshot
    pub transcript: MessagesState,
}

impl RunOutcome {
    /// Nodes in the order they ran
    pub fn visited(&self) -> Vec<&str> {
        self.updates.iter().map(|u| u.node.as_str()).collect()
    }

    /// Last non-empty assistant text of the transcript
    pub fn final_answer(&self) -> Result<&str> {
        self.transcript
            .last_answer()
            .map(|m| m.content.as_str())
            .ok_or_else(|| anyhow::anyhow!("Run finished without an assistant answer"))
    }
}

/// Seed the graph with `query`, stream every node update, and return the
/// supervisor's final transcript
pub async fn run(graph: &CompiledGraph, query: &str, verbose: bool) -> Result<RunOutcome> {
    let mut stream = Box::pin(graph.stream(MessagesState::from_user(query)));
    let mut updates = Vec::new();
    let mut transcript = None;

    while let Some(update) = stream.try_next().await? {
        if verbose {
            utils::pretty_print_update(&update, true);
        }
        if update.node == SUPERVISOR {
            transcript = Some(update.messages.clone());
        }
        updates.push(update);
    }

    let transcript = transcript
        .ok_or_else(|| anyhow::anyhow!("Run ended without a {} update", SUPERVISOR))?;
    log::info!(
        "Run finished after {} steps with {} messages",
        updates.len(),
        transcript.len()
    );

    Ok(RunOutcome {
        updates,
        transcript,
    })
}

/// Mermaid source path written alongside the image
pub fn mermaid_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("mmd")
}

/// Write the Mermaid source for `image_path` and return where it went
pub fn write_mermaid(graph: &CompiledGraph, image_path: &Path) -> Result<PathBuf> {
    let source_path = mermaid_path(image_path);
    fs::write(&source_path, graph.draw_mermaid())?;
    log::info!("Graph diagram source written to {}", source_path.display());
    Ok(source_path)
}

/// Write the topology diagram and show it: Mermaid source always, PNG when
/// mermaid.ink is reachable. A missing or unopenable PNG is only a warning.
pub async fn render_graph(graph: &CompiledGraph, image_path: &Path) -> Result<()> {
    write_mermaid(graph, image_path)?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;
    match graph.draw_mermaid_png(&client).await {
        Ok(bytes) => {
            fs::write(image_path, bytes)?;
            log::info!("Graph image written to {}", image_path.display());
            if let Err(e) = open::that(image_path) {
                log::warn!("Failed to open graph image {}: {}", image_path.display(), e);
            }
        }
        Err(e) => log::warn!("Failed to render graph image: {}", e),
    }
    Ok(())
}
