//! Agent execution error types.
//!
//! Returned by graph nodes and by `CompiledStateGraph::invoke` / `resume`.

use thiserror::Error;

use crate::graph::GraphInterrupt;
use crate::memory::CheckpointError;

/// Agent execution error.
///
/// Nodes return this when a step fails; the compiled graph returns it from `invoke`
/// and `resume`. `Interrupted` is not a failure: it signals a pause before a node
/// listed in `interrupt_before`, with the state saved in the checkpointer.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Execution failed with a message (e.g. LLM call failed, tool error).
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// Graph execution was interrupted.
    ///
    /// Raised by the compiled graph before running an interrupt-before node. The
    /// checkpoint for the thread records the pending node; call `resume` to continue.
    #[error("graph interrupted: {0}")]
    Interrupted(GraphInterrupt),

    /// Loading or saving a checkpoint failed.
    #[error("checkpoint: {0}")]
    Checkpoint(#[from] CheckpointError),
}

impl From<GraphInterrupt> for AgentError {
    fn from(interrupt: GraphInterrupt) -> Self {
        AgentError::Interrupted(interrupt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Display format of ExecutionFailed contains "execution failed" and the message.
    #[test]
    fn agent_error_display_execution_failed() {
        let err = AgentError::ExecutionFailed("msg".to_string());
        let s = err.to_string();
        assert!(s.contains("execution failed"), "{}", s);
        assert!(s.contains("msg"), "{}", s);
    }

    /// **Scenario**: CheckpointError converts into AgentError::Checkpoint via `?`.
    #[test]
    fn checkpoint_error_converts() {
        fn fails() -> Result<(), AgentError> {
            Err(CheckpointError::ThreadIdRequired)?
        }
        match fails() {
            Err(AgentError::Checkpoint(CheckpointError::ThreadIdRequired)) => {}
            other => panic!("expected Checkpoint(ThreadIdRequired), got {:?}", other),
        }
    }
}
