//! Snapshot of a thread's latest checkpoint, returned by `CompiledStateGraph::get_state`.

/// Latest saved state of a thread and the node that will run on resume.
#[derive(Debug, Clone)]
pub struct StateSnapshot<S> {
    /// State values at the checkpoint.
    pub values: S,
    /// Node the run will continue at; `None` when the last run finished.
    pub next: Option<String>,
    /// `next` is an interrupt-before node: the run is waiting for `resume`.
    /// False when the run stopped because a node failed.
    pub interrupted: bool,
    /// Id of the checkpoint this snapshot was read from.
    pub checkpoint_id: String,
    /// Step counter at the checkpoint.
    pub step: i64,
}

impl<S> StateSnapshot<S> {
    /// True when the thread is paused before an interrupt-before node.
    pub fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    /// True when the last run stopped before reaching END, paused or failed.
    pub fn is_pending(&self) -> bool {
        self.next.is_some()
    }
}
