use super::{ChatProvider, ChatRequest, ChatResponse};
use crate::message::Message;
use anyhow::Result;
use std::collections::VecDeque;
use std::sync::Mutex;

/// What a [`ScriptedProvider`] was asked
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub system: String,
    pub messages: Vec<Message>,
    pub tool_names: Vec<String>,
}

/// Deterministic provider replaying canned replies in order.
///
/// Used for offline runs and tests. Running out of replies is reported as a
/// provider failure.
pub struct ScriptedProvider {
    label: String,
    replies: Mutex<VecDeque<ChatResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedProvider {
    pub fn new(label: impl Into<String>, replies: Vec<ChatResponse>) -> Self {
        Self {
            label: label.into(),
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ChatProvider for ScriptedProvider {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse> {
        let recorded = RecordedRequest {
            system: request.system.to_string(),
            messages: request.messages.to_vec(),
            tool_names: request.tools.iter().map(|t| t.name.clone()).collect(),
        };
        self.requests
            .lock()
            .map_err(|_| anyhow::anyhow!("Scripted provider {} is poisoned", self.label))?
            .push(recorded);

        let reply = self
            .replies
            .lock()
            .map_err(|_| anyhow::anyhow!("Scripted provider {} is poisoned", self.label))?
            .pop_front();

        match reply {
            Some(reply) => {
                log::debug!("Scripted provider {} replying", self.label);
                Ok(reply)
            }
            None => Err(anyhow::anyhow!(
                "Scripted provider {} has no replies left",
                self.label
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let provider = ScriptedProvider::new(
            "test",
            vec![ChatResponse::text("one"), ChatResponse::text("two")],
        );
        let messages = vec![Message::user("hi")];
        let request = ChatRequest {
            system: "prompt",
            messages: &messages,
            tools: &[],
        };

        assert_eq!(provider.complete(request).await.unwrap().content, "one");
        assert_eq!(provider.complete(request).await.unwrap().content, "two");
        assert!(provider.complete(request).await.is_err());

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].system, "prompt");
        assert_eq!(provider.remaining(), 0);
    }
}
