//! Assistant step: prompt | model, re-prompted until it says something.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::agent::prompt::AssistantPrompt;
use crate::error::AgentError;
use crate::graph::{Next, Node};
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::SupportState;

use super::graph::ASSISTANT_NODE;

/// Synthetic user turn appended when the model returns nothing usable.
pub const REPROMPT_MESSAGE: &str = "Respond with a real output.";

/// The prompt template piped into a tool-bound chat model.
pub struct AssistantRunnable {
    prompt: AssistantPrompt,
    llm: Arc<dyn LlmClient>,
}

impl AssistantRunnable {
    pub fn new(prompt: AssistantPrompt, llm: Arc<dyn LlmClient>) -> Self {
        Self { prompt, llm }
    }

    /// Renders the prompt for `state` and calls the model once.
    pub async fn invoke(&self, state: &SupportState) -> Result<LlmResponse, AgentError> {
        let messages = self.prompt.render(state);
        self.llm.invoke(&messages).await
    }
}

/// Graph node wrapping [`AssistantRunnable`].
///
/// A reply with no tool call and blank text is not accepted: the node appends
/// [`REPROMPT_MESSAGE`] to a scratch copy of the conversation and asks again. Only the
/// final reply reaches the real state. There is no limit unless `with_max_reprompts`
/// sets one.
pub struct AssistantNode {
    runnable: AssistantRunnable,
    max_reprompts: Option<usize>,
}

impl AssistantNode {
    pub fn new(runnable: AssistantRunnable) -> Self {
        Self {
            runnable,
            max_reprompts: None,
        }
    }

    pub fn with_max_reprompts(mut self, max_reprompts: Option<usize>) -> Self {
        self.max_reprompts = max_reprompts;
        self
    }

    async fn respond(&self, state: &SupportState) -> Result<LlmResponse, AgentError> {
        let mut scratch = state.clone();
        let mut reprompts = 0usize;
        loop {
            let response = self.runnable.invoke(&scratch).await?;
            if !response.is_empty() {
                return Ok(response);
            }
            if self.max_reprompts.is_some_and(|max| reprompts >= max) {
                return Err(AgentError::ExecutionFailed(format!(
                    "model returned an empty reply after {} re-prompts",
                    reprompts
                )));
            }
            reprompts += 1;
            warn!(reprompts, "empty model reply, re-prompting");
            scratch.messages.push(Message::user(REPROMPT_MESSAGE));
        }
    }
}

#[async_trait]
impl Node<SupportState> for AssistantNode {
    fn id(&self) -> &str {
        ASSISTANT_NODE
    }

    async fn run(&self, state: SupportState) -> Result<(SupportState, Next), AgentError> {
        let response = self.respond(&state).await?;
        tracing::debug!(
            tool_calls = response.tool_calls.len(),
            content_len = response.content.len(),
            "assistant replied"
        );
        let mut state = state;
        state.messages.push(response.into_message());
        Ok((state, Next::Continue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlm;
    use crate::state::ToolCall;

    fn node(llm: Arc<MockLlm>) -> AssistantNode {
        AssistantNode::new(AssistantRunnable::new(AssistantPrompt::new(), llm))
    }

    /// **Scenario**: a non-empty first reply is accepted after exactly one call.
    #[tokio::test]
    async fn text_reply_needs_one_call() {
        let llm = Arc::new(MockLlm::with_no_tool_calls("Your flight leaves at 9."));
        let (state, next) = node(llm.clone())
            .run(SupportState::from_user("when?"))
            .await
            .unwrap();
        assert_eq!(llm.calls(), 1);
        assert!(matches!(next, Next::Continue));
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.last_reply(), Some("Your flight leaves at 9."));
    }

    /// **Scenario**: a tool call with empty text is accepted as is.
    #[tokio::test]
    async fn tool_call_with_empty_text_needs_one_call() {
        let call = ToolCall {
            id: "c1".into(),
            name: "search_flights".into(),
            arguments: "{}".into(),
        };
        let llm = Arc::new(MockLlm::scripted(vec![LlmResponse::with_tool_calls(
            "",
            vec![call.clone()],
        )]));
        let (state, _) = node(llm.clone())
            .run(SupportState::from_user("flights to BSL"))
            .await
            .unwrap();
        assert_eq!(llm.calls(), 1);
        assert_eq!(state.pending_tool_calls(), &[call]);
    }

    /// **Scenario**: blank replies are re-prompted on a scratch copy; the state only
    /// gains the final reply.
    #[tokio::test]
    async fn empty_reply_is_reprompted() {
        let llm = Arc::new(MockLlm::scripted(vec![
            LlmResponse::text(""),
            LlmResponse::text("  "),
            LlmResponse::text("Here you go."),
        ]));
        let (state, _) = node(llm.clone())
            .run(SupportState::from_user("hello"))
            .await
            .unwrap();
        assert_eq!(llm.calls(), 3);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.last_reply(), Some("Here you go."));

        let received = llm.received();
        assert_eq!(received[0].len(), 2);
        assert_eq!(received[1].last(), Some(&Message::user(REPROMPT_MESSAGE)));
        assert_eq!(received[2].len(), 4);
    }

    #[tokio::test]
    async fn capped_reprompts_fail() {
        let llm = Arc::new(MockLlm::with_no_tool_calls(""));
        let err = node(llm.clone())
            .with_max_reprompts(Some(2))
            .run(SupportState::from_user("hello"))
            .await
            .unwrap_err();
        assert_eq!(llm.calls(), 3);
        assert!(err.to_string().contains("empty reply"));
    }
}
