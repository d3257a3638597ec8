//! Run context passed into nodes.

use crate::memory::RunnableConfig;

/// Per-run context handed to `Node::run_with_context`.
///
/// Carries the invoke config so nodes can reach the thread and passenger ids
/// (the tools node forwards them to tools as `ToolCallContext`).
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    /// Config for the current run.
    pub config: RunnableConfig,
    /// Step counter of the node being run (0 for the first node of a fresh run).
    pub step: i64,
}

impl RunContext {
    pub fn new(config: RunnableConfig) -> Self {
        Self { config, step: 0 }
    }

    pub(crate) fn at_step(&self, step: i64) -> Self {
        Self {
            config: self.config.clone(),
            step,
        }
    }
}
