//! Context passed into tool calls for the current run.
//!
//! The tools node fills it from the run's [`RunnableConfig`](crate::memory::RunnableConfig)
//! so ticket tools know which passenger is signed in.

use crate::memory::RunnableConfig;

/// Per-run context available to tools during execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallContext {
    /// Passenger whose tickets the tools may read and change.
    pub passenger_id: Option<String>,
    pub thread_id: Option<String>,
}

impl ToolCallContext {
    pub fn for_passenger(passenger_id: impl Into<String>) -> Self {
        Self {
            passenger_id: Some(passenger_id.into()),
            thread_id: None,
        }
    }

    pub fn from_config(config: &RunnableConfig) -> Self {
        Self {
            passenger_id: config.passenger_id.clone(),
            thread_id: config.thread_id.clone(),
        }
    }
}
