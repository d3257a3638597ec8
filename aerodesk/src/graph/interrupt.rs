//! Interrupt values raised when the graph pauses for a human.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Interrupt payload.
///
/// For interrupt-before pauses `value` is `{"interrupt_before": "<node>"}` and `id`
/// is the node id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interrupt {
    /// Any JSON-serializable data describing the pause.
    pub value: serde_json::Value,
    /// Optional interrupt id.
    pub id: Option<String>,
}

impl Interrupt {
    pub fn new(value: serde_json::Value) -> Self {
        Self { value, id: None }
    }

    pub fn with_id(value: serde_json::Value, id: String) -> Self {
        Self {
            value,
            id: Some(id),
        }
    }

    /// Interrupt raised before running `node_id`.
    pub fn before_node(node_id: &str) -> Self {
        Self::with_id(
            serde_json::json!({ "interrupt_before": node_id }),
            node_id.to_string(),
        )
    }
}

/// Error carried by `AgentError::Interrupted`.
#[derive(Debug, Clone, Error)]
#[error("Graph interrupted: {0:?}")]
pub struct GraphInterrupt(pub Interrupt);

impl GraphInterrupt {
    /// Node the graph paused before, when the interrupt came from interrupt-before.
    pub fn node_id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }
}

impl From<Interrupt> for GraphInterrupt {
    fn from(interrupt: Interrupt) -> Self {
        GraphInterrupt(interrupt)
    }
}
