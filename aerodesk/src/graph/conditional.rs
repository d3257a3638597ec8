//! Conditional edges: pick the next node from the state after a node runs.

use std::collections::HashMap;
use std::sync::Arc;

/// Router function: maps the current state to a routing key.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional path map.
///
/// Without a path map the key is the next node id (or `END`). With one, the key is
/// looked up and falls back to itself when absent.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S> {
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) for `state`.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// How the compiled graph finds the node after `id`.
#[derive(Clone)]
pub enum NextEntry<S> {
    /// Fixed successor (or END). The node's own `Next` still wins when it is `Node` or `End`.
    Unconditional(String),
    /// Successor decided by the router; the node's `Next` is ignored.
    Conditional(ConditionalRouter<S>),
}
