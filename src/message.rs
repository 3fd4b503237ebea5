use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments, passed to the tool untouched
    pub arguments: String,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// One entry of the shared conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn plain(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            name: None,
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, content)
    }

    /// Tool result answering the call `tool_call_id` made to `name`
    pub fn tool(
        content: impl Into<String>,
        name: impl Into<String>,
        tool_call_id: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            tool_call_id: Some(tool_call_id.into()),
            ..Self::plain(Role::Tool, content)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Append-only message history shared by every node of a run.
///
/// There is no way to edit or drop a message once pushed; nodes hand back a
/// longer history and [`MessagesState::merge`] takes the new suffix.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagesState {
    messages: Vec<Message>,
}

impl MessagesState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn is_prefix_of(&self, other: &MessagesState) -> bool {
        other.messages.starts_with(&self.messages)
    }

    /// Take the messages `next` adds on top of this history.
    ///
    /// Fails when `next` does not extend the current history, which would
    /// mean a node rewrote or dropped earlier messages.
    pub fn merge(&mut self, next: MessagesState) -> Result<&[Message]> {
        if !self.is_prefix_of(&next) {
            return Err(anyhow::anyhow!(
                "State update does not extend the conversation ({} messages before, {} in update)",
                self.messages.len(),
                next.messages.len()
            ));
        }

        let start = self.messages.len();
        self.messages.extend(next.messages.into_iter().skip(start));
        Ok(&self.messages[start..])
    }

    /// Last assistant message with non-empty text
    pub fn last_answer(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.content.trim().is_empty())
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for MessagesState {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_appends_suffix() {
        let mut state = MessagesState::from_user("hi");
        let mut next = state.clone();
        next.push(Message::assistant("hello").with_name("supervisor"));

        let appended = state.merge(next).unwrap();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].content, "hello");
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn merge_rejects_rewritten_history() {
        let mut state = MessagesState::from_user("hi");
        state.push(Message::assistant("first"));

        let rewritten = MessagesState::from(vec![
            Message::user("hi"),
            Message::assistant("second"),
        ]);
        assert!(state.merge(rewritten).is_err());
        assert_eq!(state.messages()[1].content, "first");
    }

    #[test]
    fn merge_rejects_shorter_history() {
        let mut state = MessagesState::from_user("hi");
        state.push(Message::assistant("there"));
        assert!(state.merge(MessagesState::from_user("hi")).is_err());
    }

    #[test]
    fn last_answer_skips_tool_traffic() {
        let state = MessagesState::from(vec![
            Message::user("q"),
            Message::assistant("answer"),
            Message::assistant("").with_tool_calls(vec![ToolCall::new("c1", "t", "{}")]),
            Message::tool("ok", "t", "c1"),
        ]);
        assert_eq!(state.last_answer().unwrap().content, "answer");
    }

    #[test]
    fn tool_message_serializes_call_id() {
        let value = serde_json::to_value(Message::tool("done", "transfer_to_x", "call_1")).unwrap();
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "call_1");
        assert!(value.get("tool_calls").is_none());
    }
}
