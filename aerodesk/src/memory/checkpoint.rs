//! Checkpoint and metadata types.

use std::time::SystemTime;

use uuid::Uuid;

/// Metadata for a single checkpoint.
#[derive(Debug, Clone, Default)]
pub struct CheckpointMetadata {
    pub source: CheckpointSource,
    /// Number of nodes run in the thread's current run when the checkpoint was taken.
    pub step: i64,
    pub created_at: Option<SystemTime>,
}

/// Where the checkpoint came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckpointSource {
    /// Input written before any node ran.
    #[default]
    Input,
    /// Written by the run loop (end of run or interrupt).
    Loop,
    /// Written by a manual state update.
    Update,
}

impl CheckpointSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckpointSource::Input => "input",
            CheckpointSource::Loop => "loop",
            CheckpointSource::Update => "update",
        }
    }

    /// Parses a stored source; unknown values read as `Update`.
    pub fn parse(s: &str) -> Self {
        match s {
            "input" => CheckpointSource::Input,
            "loop" => CheckpointSource::Loop,
            _ => CheckpointSource::Update,
        }
    }
}

/// One saved state of a thread.
///
/// `channel_values` is the graph state. `pending_node` is set when the run paused in
/// front of that node; `resume` starts there.
#[derive(Debug, Clone)]
pub struct Checkpoint<S> {
    /// Time-ordered UUID (v7).
    pub id: String,
    /// Milliseconds since the epoch, as text.
    pub ts: String,
    pub channel_values: S,
    pub pending_node: Option<String>,
    pub metadata: CheckpointMetadata,
}

/// Item returned by `Checkpointer::list`.
#[derive(Debug, Clone)]
pub struct CheckpointListItem {
    pub checkpoint_id: String,
    pub pending_node: Option<String>,
    pub metadata: CheckpointMetadata,
}

pub(crate) fn millis_since_epoch(t: SystemTime) -> u128 {
    t.duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

impl<S> Checkpoint<S> {
    /// Checkpoint of `state` with a fresh v7 id.
    pub fn from_state(state: S, source: CheckpointSource, step: i64) -> Self {
        Self::with_id(Uuid::now_v7().to_string(), state, source, step)
    }

    pub fn with_id(id: String, state: S, source: CheckpointSource, step: i64) -> Self {
        let now = SystemTime::now();
        Self {
            id,
            ts: millis_since_epoch(now).to_string(),
            channel_values: state,
            pending_node: None,
            metadata: CheckpointMetadata {
                source,
                step,
                created_at: Some(now),
            },
        }
    }

    /// Marks the node the run paused before.
    pub fn with_pending_node(mut self, node_id: impl Into<String>) -> Self {
        self.pending_node = Some(node_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: from_state generates unique v7 ids.
    #[test]
    fn checkpoint_ids_are_v7() {
        let cp1: Checkpoint<i32> = Checkpoint::from_state(1, CheckpointSource::Input, 0);
        let cp2: Checkpoint<i32> = Checkpoint::from_state(2, CheckpointSource::Loop, 1);
        assert_ne!(cp1.id, cp2.id);
        let parsed = Uuid::parse_str(&cp1.id).unwrap();
        assert_eq!(parsed.get_version_num(), 7);
    }

    #[test]
    fn with_pending_node_sets_node() {
        let cp = Checkpoint::from_state("s".to_string(), CheckpointSource::Loop, 1)
            .with_pending_node("tools");
        assert_eq!(cp.pending_node.as_deref(), Some("tools"));
        assert_eq!(cp.metadata.step, 1);
        assert!(cp.metadata.created_at.is_some());
    }

    #[test]
    fn source_str_round_trip() {
        for s in [
            CheckpointSource::Input,
            CheckpointSource::Loop,
            CheckpointSource::Update,
        ] {
            assert_eq!(CheckpointSource::parse(s.as_str()), s);
        }
        assert_eq!(CheckpointSource::parse("??"), CheckpointSource::Update);
    }
}
