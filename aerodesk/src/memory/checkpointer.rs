//! Checkpointer trait and CheckpointError.

use async_trait::async_trait;

use crate::memory::checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata};
use crate::memory::config::RunnableConfig;

/// Error type for checkpoint operations.
#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("thread_id required")]
    ThreadIdRequired,
    #[error("serialization: {0}")]
    Serialization(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Saves and loads checkpoints by (thread_id, checkpoint_ns, checkpoint_id).
///
/// Implementations: [`MemorySaver`](super::MemorySaver) (in-process) and
/// [`SqliteSaver`](super::SqliteSaver) (persistent).
///
/// **Interaction**: Injected via `StateGraph::compile_with_checkpointer`; the compiled
/// graph writes on run end and on interrupt, and reads in `resume` / `get_state`.
#[async_trait]
pub trait Checkpointer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    /// Persist a checkpoint for the thread. Returns the checkpoint id.
    async fn put(
        &self,
        config: &RunnableConfig,
        checkpoint: &Checkpoint<S>,
    ) -> Result<String, CheckpointError>;

    /// Latest checkpoint of the thread, or the one named by `config.checkpoint_id`.
    async fn get_tuple(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<(Checkpoint<S>, CheckpointMetadata)>, CheckpointError>;

    /// Checkpoints of the thread, oldest first. `before`/`after` are exclusive ids;
    /// `limit` keeps the newest `n`.
    async fn list(
        &self,
        config: &RunnableConfig,
        limit: Option<usize>,
        before: Option<&str>,
        after: Option<&str>,
    ) -> Result<Vec<CheckpointListItem>, CheckpointError>;
}

/// Applies `after`, `before` and `limit` to an oldest-first list.
pub(crate) fn window_list(
    mut items: Vec<CheckpointListItem>,
    limit: Option<usize>,
    before: Option<&str>,
    after: Option<&str>,
) -> Vec<CheckpointListItem> {
    if let Some(a) = after {
        if let Some(pos) = items.iter().position(|i| i.checkpoint_id == a) {
            items.drain(..=pos);
        }
    }
    if let Some(b) = before {
        if let Some(pos) = items.iter().position(|i| i.checkpoint_id == b) {
            items.truncate(pos);
        }
    }
    if let Some(n) = limit {
        let len = items.len();
        if len > n {
            items.drain(..len - n);
        }
    }
    items
}
