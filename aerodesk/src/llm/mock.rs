//! Scripted LLM for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AgentError;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;

/// Mock LLM that replays a script of responses.
///
/// Each `invoke` takes the next scripted response; the last one repeats once the
/// script is down to it. Every call's messages are recorded for assertions.
///
/// **Interaction**: Implements `LlmClient`; used by `AssistantRunnable` in tests.
pub struct MockLlm {
    script: Mutex<VecDeque<LlmResponse>>,
    received: Mutex<Vec<Vec<Message>>>,
}

impl MockLlm {
    /// Replays `responses` in order. An empty script answers with empty text.
    pub fn scripted(responses: Vec<LlmResponse>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            received: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with `content` and no tool calls.
    pub fn with_no_tool_calls(content: impl Into<String>) -> Self {
        Self::scripted(vec![LlmResponse::text(content)])
    }

    /// First answers with one tool call, then with `final_text`.
    pub fn tool_call_then_text(
        name: impl Into<String>,
        arguments: impl Into<String>,
        final_text: impl Into<String>,
    ) -> Self {
        let call = ToolCall {
            id: "call-1".to_string(),
            name: name.into(),
            arguments: arguments.into(),
        };
        Self::scripted(vec![
            LlmResponse::with_tool_calls("", vec![call]),
            LlmResponse::text(final_text),
        ])
    }

    /// Number of `invoke` calls so far.
    pub fn calls(&self) -> usize {
        self.received.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Messages passed to each `invoke`, oldest first.
    pub fn received(&self) -> Vec<Vec<Message>> {
        self.received.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        if let Ok(mut received) = self.received.lock() {
            received.push(messages.to_vec());
        }
        let mut script = self
            .script
            .lock()
            .map_err(|_| AgentError::ExecutionFailed("mock llm script poisoned".into()))?;
        let response = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        Ok(response.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: the script advances per call and the last entry repeats.
    #[tokio::test]
    async fn script_advances_then_repeats_last() {
        let llm = MockLlm::scripted(vec![LlmResponse::text("a"), LlmResponse::text("b")]);
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "a");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "b");
        assert_eq!(llm.invoke(&[]).await.unwrap().content, "b");
        assert_eq!(llm.calls(), 3);
    }

    #[tokio::test]
    async fn records_received_messages() {
        let llm = MockLlm::with_no_tool_calls("ok");
        llm.invoke(&[Message::user("hi")]).await.unwrap();
        assert_eq!(llm.received(), vec![vec![Message::user("hi")]]);
    }
}
