//! Drives support conversations: one call per user turn, with approval of tool calls.

use crate::error::AgentError;
use crate::graph::CompiledStateGraph;
use crate::memory::RunnableConfig;
use crate::message::Message;
use crate::state::{SupportState, ToolCall};

/// Result of one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The assistant answered; the thread is idle.
    Reply(String),
    /// The assistant wants to run these tools; call `approve` or `deny`.
    AwaitingApproval(Vec<ToolCall>),
}

/// Compiled support graph bound to one passenger.
///
/// Every thread is checkpointed, so a turn picks up the conversation where the
/// previous one stopped, including a pause before the tools node.
pub struct SupportRunner {
    graph: CompiledStateGraph<SupportState>,
    passenger_id: Option<String>,
}

impl SupportRunner {
    pub fn new(graph: CompiledStateGraph<SupportState>, passenger_id: Option<String>) -> Self {
        Self {
            graph,
            passenger_id,
        }
    }

    pub fn graph(&self) -> &CompiledStateGraph<SupportState> {
        &self.graph
    }

    fn config_for(&self, thread_id: &str) -> RunnableConfig {
        RunnableConfig {
            passenger_id: self.passenger_id.clone(),
            ..RunnableConfig::for_thread(thread_id)
        }
    }

    /// Latest saved state of the thread.
    pub async fn state(&self, thread_id: &str) -> Result<Option<SupportState>, AgentError> {
        let snapshot = self.graph.get_state(&self.config_for(thread_id)).await?;
        Ok(snapshot.map(|s| s.values))
    }

    /// Tool calls waiting for approval; empty when the thread is not paused.
    pub async fn pending_tool_calls(&self, thread_id: &str) -> Result<Vec<ToolCall>, AgentError> {
        let snapshot = self.graph.get_state(&self.config_for(thread_id)).await?;
        Ok(match snapshot {
            Some(s) if s.is_interrupted() => s.values.pending_tool_calls().to_vec(),
            _ => Vec::new(),
        })
    }

    /// Sends a user message. On a thread paused before tools the text is taken as the
    /// reason for denying the pending calls. A thread whose last run failed keeps the
    /// steps that completed, including tool results, and starts a new run on top.
    pub async fn send(&self, thread_id: &str, text: &str) -> Result<TurnOutcome, AgentError> {
        let config = self.config_for(thread_id);
        let mut state = match self.graph.get_state(&config).await? {
            Some(snapshot) if snapshot.is_interrupted() => {
                return self.deny(thread_id, text).await;
            }
            Some(snapshot) => snapshot.values,
            None => SupportState::default(),
        };
        state.messages.push(Message::user(text));
        let result = self.graph.invoke(state, Some(config.clone())).await;
        self.outcome(result, &config).await
    }

    /// Runs the pending tool calls and continues. On a thread whose last run failed this
    /// retries from the failed step.
    pub async fn approve(&self, thread_id: &str) -> Result<TurnOutcome, AgentError> {
        let config = self.config_for(thread_id);
        tracing::info!(thread_id, "tool calls approved");
        let result = self.graph.resume(config.clone()).await;
        self.outcome(result, &config).await
    }

    /// Answers each pending tool call with the denial and lets the assistant go on.
    pub async fn deny(&self, thread_id: &str, reason: &str) -> Result<TurnOutcome, AgentError> {
        let config = self.config_for(thread_id);
        let snapshot = self
            .graph
            .get_state(&config)
            .await?
            .filter(|s| s.is_interrupted())
            .ok_or_else(|| {
                AgentError::ExecutionFailed(format!("thread {} is not awaiting approval", thread_id))
            })?;
        tracing::info!(thread_id, "tool calls denied");
        let mut state = snapshot.values;
        let denied: Vec<Message> = state
            .pending_tool_calls()
            .iter()
            .map(|call| Message::tool(call.id.clone(), denial_message(reason)))
            .collect();
        state.messages.extend(denied);
        let result = self.graph.invoke(state, Some(config.clone())).await;
        self.outcome(result, &config).await
    }

    async fn outcome(
        &self,
        result: Result<SupportState, AgentError>,
        config: &RunnableConfig,
    ) -> Result<TurnOutcome, AgentError> {
        match result {
            Ok(state) => Ok(TurnOutcome::Reply(
                state.last_reply().unwrap_or_default().to_string(),
            )),
            Err(AgentError::Interrupted(_)) => {
                let calls = self
                    .graph
                    .get_state(config)
                    .await?
                    .map(|s| s.values.pending_tool_calls().to_vec())
                    .unwrap_or_default();
                Ok(TurnOutcome::AwaitingApproval(calls))
            }
            Err(e) => Err(e),
        }
    }
}

pub(crate) fn denial_message(reason: &str) -> String {
    format!(
        "API call denied by user. Reasoning: '{}'. Continue assisting, accounting for the user's input.",
        reason
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denial_message_quotes_reason() {
        assert_eq!(
            denial_message("wrong date"),
            "API call denied by user. Reasoning: 'wrong date'. Continue assisting, accounting for the user's input."
        );
    }
}
