use super::{CompiledGraph, END, START};
use anyhow::Result;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use reqwest::Client;
use std::fmt::Write as _;

const MERMAID_INK_URL: &str = "https://mermaid.ink/img";

impl CompiledGraph {
    /// Mermaid flowchart of the topology.
    ///
    /// Fixed edges are solid, handoff destinations dotted.
    pub fn draw_mermaid(&self) -> String {
        let mut out = String::new();
        out.push_str("---\nconfig:\n  flowchart:\n    curve: linear\n---\ngraph TD;\n");

        let _ = writeln!(out, "\t{START}([<p>{START}</p>]):::first");
        for name in &self.order {
            let _ = writeln!(out, "\t{name}({name})");
        }
        let _ = writeln!(out, "\t{END}([<p>{END}</p>]):::last");

        let _ = writeln!(out, "\t{START} --> {};", self.entry);
        for name in &self.order {
            if let Some(target) = self.edges.get(name) {
                let _ = writeln!(out, "\t{name} --> {target};");
            }
        }
        for name in &self.order {
            for target in self.destinations(name) {
                let _ = writeln!(out, "\t{name} -.-> {target};");
            }
        }

        out.push_str("\tclassDef default fill:#f2f0ff,line-height:1.2\n");
        out.push_str("\tclassDef first fill-opacity:0\n");
        out.push_str("\tclassDef last fill:#bfb6fc\n");
        out
    }

    /// Render the Mermaid diagram to PNG through mermaid.ink
    pub async fn draw_mermaid_png(&self, client: &Client) -> Result<Vec<u8>> {
        let encoded = URL_SAFE.encode(self.draw_mermaid());
        let url = format!("{}/{}?type=png", MERMAID_INK_URL, encoded);

        log::debug!("Requesting graph image from mermaid.ink");
        let response = client.get(&url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "mermaid.ink returned {}: {}",
                status,
                error_text
            ));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
