//! Checkpointing: save and load graph state per thread.
//!
//! - [`RunnableConfig`]: thread id, optional checkpoint id, namespace, passenger id.
//! - [`Checkpoint`]: state plus the node a paused run will resume at.
//! - [`Checkpointer`]: [`MemorySaver`] (in-process) and [`SqliteSaver`] (file-backed,
//!   state encoded with a [`Serializer`] such as [`JsonSerializer`]).

mod checkpoint;
mod checkpointer;
mod config;
mod memory_saver;
mod serializer;
mod sqlite_saver;

pub use checkpoint::{Checkpoint, CheckpointListItem, CheckpointMetadata, CheckpointSource};
pub use checkpointer::{CheckpointError, Checkpointer};
pub use config::RunnableConfig;
pub use memory_saver::MemorySaver;
pub use serializer::{JsonSerializer, Serializer};
pub use sqlite_saver::SqliteSaver;
