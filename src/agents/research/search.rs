use crate::tool::{Tool, ToolContext, ToolOutput};
use anyhow::Result;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::env;

pub const DEFAULT_MAX_RESULTS: usize = 3;

#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: String,
    pub api_url: String,
    pub max_results: usize,
    pub client: Client,
}

impl TavilyConfig {
    pub fn new() -> Result<Self> {
        let api_key = env::var("TAVILY_API_KEY")
            .map_err(|_| anyhow::anyhow!("TAVILY_API_KEY environment variable not set"))?;
        let api_url = env::var("TAVILY_API_URL")
            .unwrap_or_else(|_| "https://api.tavily.com/search".to_string());
        let timeout_seconds = env::var("TAVILY_TIMEOUT")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .unwrap_or(60);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()?;

        Ok(Self {
            api_key,
            api_url,
            max_results: DEFAULT_MAX_RESULTS,
            client,
        })
    }
}

#[derive(Deserialize)]
struct SearchParams {
    query: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Tavily web search returning at most `max_results` ranked snippets
pub struct TavilySearch {
    config: TavilyConfig,
}

impl TavilySearch {
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: TavilyConfig::new()?,
        })
    }

    pub fn with_config(config: TavilyConfig) -> Self {
        Self { config }
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let response = self
            .config
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&json!({
                "query": query,
                "max_results": self.config.max_results,
                "search_depth": "basic"
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Tavily API error: {}", error_text));
        }

        let body: SearchResponse = response.json().await?;
        Ok(cap_results(body.results, self.config.max_results))
    }
}

fn cap_results(mut results: Vec<SearchResult>, max_results: usize) -> Vec<SearchResult> {
    results.truncate(max_results);
    results
}

#[async_trait::async_trait]
impl Tool for TavilySearch {
    fn name(&self) -> &str {
        "tavily_search"
    }

    fn description(&self) -> &str {
        "A search engine optimized for comprehensive, accurate, and trusted results. Useful for when you need to answer questions about current events. Input should be a search query."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query to look up"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: &str, _ctx: ToolContext<'_>) -> Result<ToolOutput> {
        let params: SearchParams = serde_json::from_str(arguments)?;
        if params.query.trim().is_empty() {
            return Err(anyhow::anyhow!("Search query cannot be empty"));
        }

        let results = self.search(&params.query).await?;
        log::info!(
            "Search for '{}' returned {} results",
            params.query,
            results.len()
        );

        Ok(ToolOutput::Content(serde_json::to_string_pretty(&json!({
            "query": params.query,
            "results": results
        }))?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tavily_response_and_caps_results() {
        let body = json!({
            "query": "ai in education",
            "results": [
                {"title": "A", "url": "https://a.example", "content": "first", "score": 0.9},
                {"title": "B", "url": "https://b.example", "content": "second", "score": 0.8},
                {"title": "C", "url": "https://c.example", "content": "third", "score": 0.7},
                {"title": "D", "url": "https://d.example", "content": "fourth", "score": 0.6}
            ],
            "response_time": 1.2
        });
        let parsed: SearchResponse = serde_json::from_value(body).unwrap();
        let capped = cap_results(parsed.results, DEFAULT_MAX_RESULTS);

        assert_eq!(capped.len(), 3);
        assert_eq!(capped[0].title, "A");
        assert_eq!(capped[2].content, "third");
    }

    #[test]
    fn missing_results_parse_as_empty() {
        let parsed: SearchResponse = serde_json::from_value(json!({"query": "x"})).unwrap();
        assert!(parsed.results.is_empty());
    }
}
