//! Invoke config: thread_id, checkpoint_id, checkpoint_ns, passenger_id.

/// Config for a single invoke. Identifies the thread, an optional checkpoint and the
/// signed-in passenger.
///
/// **Interaction**: Passed to `CompiledStateGraph::invoke` / `resume` / `get_state` and
/// to `Checkpointer`. Nodes see it through `RunContext`.
#[derive(Debug, Clone, Default)]
pub struct RunnableConfig {
    /// Conversation id. Required when using a checkpointer.
    pub thread_id: Option<String>,
    /// Read this checkpoint instead of the latest.
    pub checkpoint_id: Option<String>,
    /// Checkpoint namespace. Default is empty.
    pub checkpoint_ns: String,
    /// Passenger the tools act for (e.g. `"3442 587242"`).
    pub passenger_id: Option<String>,
}

impl RunnableConfig {
    /// Config for `thread_id` with no passenger.
    pub fn for_thread(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
            ..Default::default()
        }
    }

    pub fn with_passenger_id(mut self, passenger_id: impl Into<String>) -> Self {
        self.passenger_id = Some(passenger_id.into());
        self
    }
}
