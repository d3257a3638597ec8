//! Next-step result from a graph node: follow the edge, jump to a node, or end.

/// Next step after running a node.
///
/// - **Continue**: follow the node's outgoing edge (or its conditional router).
/// - **Node(id)**: jump to the given node.
/// - **End**: stop; the current state is the result.
///
/// Nodes with conditional edges have their `Next` ignored; the router decides.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; a node without one ends the run.
    Continue,
    /// Run the node with the given id next.
    Node(String),
    /// Stop and return the current state.
    End,
}
