//! LLM client abstraction used by the assistant node.
//!
//! The assistant renders its prompt into a `Vec<Message>` and calls
//! [`LlmClient::invoke`]; the response carries assistant text and optional tool calls.
//! Implementations: [`ChatOpenAI`] (OpenAI-compatible chat completions, used with the
//! Gemini endpoint by default) and [`MockLlm`] (scripted, for tests).

mod mock;
mod openai;

pub use mock::MockLlm;
pub use openai::ChatOpenAI;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::message::Message;
use crate::state::ToolCall;

/// Response from an LLM completion: assistant text and optional tool calls.
#[derive(Clone, Debug, Default)]
pub struct LlmResponse {
    pub content: String,
    /// Empty means a plain answer.
    pub tool_calls: Vec<ToolCall>,
}

impl LlmResponse {
    /// Plain text response.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: content.into(),
            tool_calls,
        }
    }

    /// No tool call and nothing but whitespace in the text.
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.content.trim().is_empty()
    }

    /// Converts into the assistant message appended to the conversation.
    pub fn into_message(self) -> Message {
        Message::assistant_with_tool_calls(self.content, self.tool_calls)
    }
}

/// LLM client: given messages, returns assistant text and optional tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// One completion for `messages` (system prompt first).
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: whitespace-only text without tool calls is empty; any tool call is not.
    #[test]
    fn llm_response_is_empty() {
        assert!(LlmResponse::text("").is_empty());
        assert!(LlmResponse::text(" \n\t").is_empty());
        assert!(!LlmResponse::text("ok").is_empty());
        let call = ToolCall {
            id: "c1".into(),
            name: "lookup_policy".into(),
            arguments: "{}".into(),
        };
        assert!(!LlmResponse::with_tool_calls("", vec![call]).is_empty());
    }
}
