//! Support-agent state and tool call types.
//!
//! [`SupportState`] holds the conversation and a snapshot of the passenger's flight
//! information. The fetch node writes `user_info`; the assistant and tools nodes append
//! to `messages`.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// A single tool invocation produced by the model.
///
/// `arguments` is the raw JSON string from the model; the tools node parses it.
/// `id` pairs the call with its `Message::Tool` answer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Id assigned by the model; echoed back in the tool message.
    pub id: String,
    /// Tool name as registered in the tool source.
    pub name: String,
    /// Arguments as a JSON string.
    pub arguments: String,
}

/// State for the support graph: fetch_user_info → assistant ⇄ tools.
///
/// Messages only grow: nodes push to the end and never rewrite history.
/// `user_info` is set by the fetch node at the start of every run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupportState {
    /// Conversation history (user, assistant and tool messages; no system prompt).
    pub messages: Vec<Message>,
    /// Passenger flight information rendered as text for the prompt.
    #[serde(default)]
    pub user_info: String,
}

impl SupportState {
    /// State holding a single user message.
    pub fn from_user(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            user_info: String::new(),
        }
    }

    /// Tool calls of the last message when it is an assistant message; empty otherwise.
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        match self.messages.last() {
            Some(Message::Assistant { tool_calls, .. }) => tool_calls,
            _ => &[],
        }
    }

    /// Content of the most recent assistant message.
    pub fn last_reply(&self) -> Option<&str> {
        self.messages.iter().rev().find_map(|m| match m {
            Message::Assistant { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(id: &str) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: "search_flights".into(),
            arguments: "{}".into(),
        }
    }

    /// **Scenario**: pending_tool_calls only looks at the last message.
    #[test]
    fn pending_tool_calls_reads_last_assistant_message() {
        let mut state = SupportState::from_user("hi");
        assert!(state.pending_tool_calls().is_empty());

        state
            .messages
            .push(Message::assistant_with_tool_calls("", vec![call("c1")]));
        assert_eq!(state.pending_tool_calls().len(), 1);

        state.messages.push(Message::tool("c1", "[]"));
        assert!(state.pending_tool_calls().is_empty());
    }

    /// **Scenario**: last_reply skips trailing tool messages and returns the latest assistant text.
    #[test]
    fn last_reply_finds_latest_assistant() {
        let mut state = SupportState::from_user("hi");
        assert_eq!(state.last_reply(), None);
        state.messages.push(Message::assistant("first"));
        state.messages.push(Message::user("again"));
        state.messages.push(Message::assistant("second"));
        assert_eq!(state.last_reply(), Some("second"));
    }

    /// **Scenario**: state deserializes when user_info is missing.
    #[test]
    fn deserialize_without_user_info() {
        let s: SupportState = serde_json::from_str(r#"{"messages":[]}"#).unwrap();
        assert!(s.user_info.is_empty());
    }
}
