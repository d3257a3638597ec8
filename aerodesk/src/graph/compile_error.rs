//! Graph compilation error.

use thiserror::Error;

/// Error from `StateGraph::compile` / `compile_with_checkpointer`.
#[derive(Debug, Error)]
pub enum CompilationError {
    /// An edge, conditional source or interrupt-before entry names an unregistered node.
    #[error("node not found: {0}")]
    NodeNotFound(String),

    /// No edge leaves START.
    #[error("graph must have exactly one edge from START")]
    MissingStart,

    /// No edge or conditional route reaches END.
    #[error("graph must have at least one route to END")]
    MissingEnd,

    /// Branching plain edges (e.g. two edges from START or from one node).
    #[error("invalid edges: {0}")]
    InvalidChain(String),

    /// A node has both an outgoing edge and conditional edges.
    #[error("node has both edge and conditional edges: {0}")]
    NodeHasBothEdgeAndConditional(String),

    /// A path_map value is neither a node id nor END.
    #[error("conditional path_map invalid target: {0}")]
    InvalidConditionalPathMap(String),
}
