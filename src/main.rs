use agent_supervisor::driver::{self, EXAMPLE_QUERY};
use agent_supervisor::team::build_team_from_env;
use agent_supervisor::utils;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    // Query from the first argument, the education example otherwise
    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| EXAMPLE_QUERY.to_string());

    let image_path = PathBuf::from(
        std::env::var("GRAPH_IMAGE_PATH").unwrap_or_else(|_| "graph.png".to_string()),
    );

    let graph = build_team_from_env()?;
    driver::render_graph(&graph, &image_path).await?;

    let outcome = driver::run(&graph, &query, true).await?;

    println!("Visited: {}", outcome.visited().join(" -> "));
    println!();
    println!("Final message history:");
    for message in outcome.transcript.messages() {
        println!("{}", utils::format_message(message));
    }

    Ok(())
}
