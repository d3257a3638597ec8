//! Structured logging for graph execution events.

use std::fmt::Debug;

pub fn log_node_start(node_id: &str) {
    tracing::debug!(node_id = node_id, "Starting node execution");
}

/// Logs the input state of a node at debug level.
pub fn log_node_state<S: Debug>(node_id: &str, state: &S) {
    tracing::debug!(node_id = node_id, state = ?state, "Node execution: state");
}

pub fn log_node_complete(node_id: &str, next: &crate::graph::Next) {
    tracing::debug!(node_id = node_id, ?next, "Node execution complete");
}

pub fn log_graph_start(thread_id: Option<&str>) {
    tracing::info!(thread_id = thread_id.unwrap_or(""), "Starting graph execution");
}

pub fn log_graph_complete(thread_id: Option<&str>) {
    tracing::info!(thread_id = thread_id.unwrap_or(""), "Graph execution complete");
}

/// Logs a pause before an interrupt-before node.
pub fn log_graph_interrupt(node_id: &str, thread_id: Option<&str>) {
    tracing::info!(
        node_id = node_id,
        thread_id = thread_id.unwrap_or(""),
        "Graph interrupted before node"
    );
}

pub fn log_graph_error(error: &crate::error::AgentError) {
    tracing::error!(?error, "Graph execution error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_functions() {
        log_node_start("test_node");
        log_node_state("test_node", &());
        log_node_complete("test_node", &crate::graph::Next::End);
        log_graph_start(Some("t1"));
        log_graph_complete(None);
        log_graph_interrupt("tools", Some("t1"));
        log_graph_error(&crate::error::AgentError::ExecutionFailed(
            "test".to_string(),
        ));
    }
}
