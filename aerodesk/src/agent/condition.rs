//! Routing after the assistant: tools or end.

use crate::graph::END;
use crate::state::SupportState;

use super::graph::TOOLS_NODE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolsConditionResult {
    /// Route to the tools node.
    Tools,
    /// Route to END.
    End,
}

impl ToolsConditionResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tools => TOOLS_NODE,
            Self::End => END,
        }
    }
}

/// `Tools` when the last message is an assistant message carrying tool calls.
pub fn tools_condition(state: &SupportState) -> ToolsConditionResult {
    if state.pending_tool_calls().is_empty() {
        ToolsConditionResult::End
    } else {
        ToolsConditionResult::Tools
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;
    use crate::state::ToolCall;

    #[test]
    fn tools_condition_returns_end_without_tool_calls() {
        let mut state = SupportState::from_user("hello");
        assert_eq!(tools_condition(&state), ToolsConditionResult::End);
        state.messages.push(Message::assistant("hi"));
        assert_eq!(tools_condition(&state).as_str(), "__end__");
    }

    #[test]
    fn tools_condition_returns_tools_when_last_message_calls_tools() {
        let mut state = SupportState::from_user("search");
        state.messages.push(Message::assistant_with_tool_calls(
            "",
            vec![ToolCall {
                id: "tc1".into(),
                name: "search_flights".into(),
                arguments: "{}".into(),
            }],
        ));
        assert_eq!(tools_condition(&state), ToolsConditionResult::Tools);
        assert_eq!(tools_condition(&state).as_str(), "tools");

        state.messages.push(Message::tool("tc1", "[]"));
        assert_eq!(tools_condition(&state), ToolsConditionResult::End);
    }
}
