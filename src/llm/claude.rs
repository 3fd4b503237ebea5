use super::{ChatProvider, ChatRequest, ChatResponse};
use crate::message::{Message, Role, ToolCall};
use crate::ClaudeConfig;
use anyhow::Result;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Anthropic Messages API provider
pub struct ClaudeProvider {
    config: ClaudeConfig,
}

impl ClaudeProvider {
    pub fn new() -> Result<Self> {
        let config = ClaudeConfig::new()?;
        Ok(Self { config })
    }

    pub fn with_config(config: ClaudeConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl ChatProvider for ClaudeProvider {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        let tool_names: HashSet<&str> = request.tools.iter().map(|t| t.name.as_str()).collect();
        let messages = to_claude_messages(request.messages, &tool_names);

        let mut request_payload = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": request.system,
            "messages": messages,
        });
        if !request.tools.is_empty() {
            request_payload["tools"] = serde_json::to_value(request.tools)?;
        }

        log::debug!(
            "Calling Claude API - {} messages, {} tools",
            request.messages.len(),
            request.tools.len()
        );

        let response = self
            .config
            .client
            .post(&self.config.api_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(anyhow::anyhow!("Claude API error: {}", error_text));
        }

        let claude_response: Value = response.json().await?;
        parse_claude_response(&claude_response)
    }
}

/// Read text and tool_use blocks out of a Messages API response
fn parse_claude_response(claude_response: &Value) -> Result<ChatResponse> {
    let content = claude_response
        .get("content")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow::anyhow!("Claude response has no content array"))?;

    let mut text = Vec::new();
    let mut tool_calls = Vec::new();

    for content_element in content {
        match content_element.get("type").and_then(|t| t.as_str()) {
            Some("text") => {
                if let Some(t) = content_element.get("text").and_then(|t| t.as_str()) {
                    text.push(t.to_string());
                }
            }
            Some("tool_use") => {
                let id = content_element.get("id").and_then(|id| id.as_str());
                let name = content_element.get("name").and_then(|name| name.as_str());
                match (id, name) {
                    (Some(id), Some(name)) => {
                        let input = content_element.get("input").cloned().unwrap_or(json!({}));
                        tool_calls.push(ToolCall::new(id, name, input.to_string()));
                    }
                    _ => return Err(anyhow::anyhow!("Malformed tool_use block: {}", content_element)),
                }
            }
            _ => {}
        }
    }

    Ok(ChatResponse {
        content: text.join("\n"),
        tool_calls,
    })
}

/// Map the shared history onto Messages API turns.
///
/// Only calls to tools in `own_tools` stay structured; other agents' tool
/// traffic is rendered as text since the API rejects tool blocks it has no
/// definition for. Consecutive same-role entries are merged into one turn.
fn to_claude_messages(messages: &[Message], own_tools: &HashSet<&str>) -> Vec<Value> {
    let mut turns: Vec<(&'static str, Vec<Value>)> = Vec::new();
    let mut own_call_ids: HashSet<&str> = HashSet::new();

    for message in messages {
        let (role, blocks) = match message.role {
            Role::System => continue,
            Role::User => ("user", text_block(&message.content).into_iter().collect()),
            Role::Assistant => {
                let mut blocks: Vec<Value> = text_block(&message.content).into_iter().collect();
                for call in &message.tool_calls {
                    if own_tools.contains(call.name.as_str()) {
                        own_call_ids.insert(call.id.as_str());
                        let input: Value =
                            serde_json::from_str(&call.arguments).unwrap_or_else(|_| json!({}));
                        blocks.push(json!({
                            "type": "tool_use",
                            "id": call.id,
                            "name": call.name,
                            "input": input
                        }));
                    } else {
                        blocks.push(json!({
                            "type": "text",
                            "text": format!("[called {}]", call.name)
                        }));
                    }
                }
                ("assistant", blocks)
            }
            Role::Tool => {
                let own = message
                    .tool_call_id
                    .as_deref()
                    .is_some_and(|id| own_call_ids.contains(id));
                let block = if own {
                    json!({
                        "type": "tool_result",
                        "tool_use_id": message.tool_call_id,
                        "content": message.content
                    })
                } else {
                    json!({
                        "type": "text",
                        "text": format!(
                            "[{}] {}",
                            message.name.as_deref().unwrap_or("tool"),
                            message.content
                        )
                    })
                };
                ("user", vec![block])
            }
        };

        if blocks.is_empty() {
            continue;
        }
        match turns.last_mut() {
            Some((last_role, last_blocks)) if *last_role == role => last_blocks.extend(blocks),
            _ => turns.push((role, blocks)),
        }
    }

    if turns.first().map(|(role, _)| *role) != Some("user") {
        turns.insert(0, ("user", vec![json!({"type": "text", "text": "Continue."})]));
    }
    if turns.last().map(|(role, _)| *role) == Some("assistant") {
        turns.push(("user", vec![json!({"type": "text", "text": "Continue."})]));
    }

    turns
        .into_iter()
        .map(|(role, content)| json!({ "role": role, "content": content }))
        .collect()
}

fn text_block(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        None
    } else {
        Some(json!({ "type": "text", "text": text }))
    }
}
