//! State graph builder: nodes, edges, conditional edges, then compile.
//!
//! Add nodes with `add_node`, wire them with `add_edge(from, to)` using `START` and
//! `END` for entry and exit, and route on state with `add_conditional_edges`. A node
//! has either one outgoing edge or conditional edges, never both.
//!
//! `with_interrupt_before` names nodes the compiled graph pauses in front of; such a
//! graph is only useful with a checkpointer (`compile_with_checkpointer`), since the
//! paused state lives there until `resume`.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::graph::compile_error::CompilationError;
use crate::graph::compiled::CompiledStateGraph;
use crate::graph::conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
use crate::graph::node::Node;
use crate::graph::retry::RetryPolicy;
use crate::memory::Checkpointer;

/// Sentinel for graph entry: `add_edge(START, first_node_id)`.
pub const START: &str = "__start__";

/// Sentinel for graph exit: `add_edge(last_node_id, END)` or a router returning END.
pub const END: &str = "__end__";

/// State graph: nodes plus explicit edges and optional conditional edges.
pub struct StateGraph<S> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// Edges (from_id, to_id).
    edges: Vec<(String, String)>,
    conditional_edges: HashMap<String, ConditionalRouter<S>>,
    interrupt_before: HashSet<String>,
    retry_policy: RetryPolicy,
}

impl<S> Default for StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<S> StateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: Vec::new(),
            conditional_edges: HashMap::new(),
            interrupt_before: HashSet::new(),
            retry_policy: RetryPolicy::None,
        }
    }

    /// Retry policy applied to every node run. Interrupts are never retried.
    pub fn with_retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self {
            retry_policy,
            ..self
        }
    }

    /// Nodes to pause in front of. Each id must be registered before `compile`.
    pub fn with_interrupt_before<I, T>(mut self, node_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.interrupt_before
            .extend(node_ids.into_iter().map(Into::into));
        self
    }

    /// Adds a node; replaces any node with the same id.
    pub fn add_node(&mut self, id: impl Into<String>, node: Arc<dyn Node<S>>) -> &mut Self {
        self.nodes.insert(id.into(), node);
        self
    }

    pub fn add_edge(&mut self, from_id: impl Into<String>, to_id: impl Into<String>) -> &mut Self {
        self.edges.push((from_id.into(), to_id.into()));
        self
    }

    /// Adds conditional edges from `source`.
    ///
    /// After `source` runs, `path(state)` yields a key; the next node is
    /// `path_map[key]` when a map is given and has the key, otherwise the key itself.
    ///
    /// ```rust,ignore
    /// graph.add_conditional_edges(
    ///     "assistant",
    ///     Arc::new(|s: &SupportState| tools_condition(s).as_str().to_string()),
    ///     Some([("tools".into(), "tools".into()), (END.into(), END.into())].into_iter().collect()),
    /// );
    /// ```
    pub fn add_conditional_edges(
        &mut self,
        source: impl Into<String>,
        path: ConditionalRouterFn<S>,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self {
        self.conditional_edges
            .insert(source.into(), ConditionalRouter::new(path, path_map));
        self
    }

    /// Builds the executable graph without persistence.
    pub fn compile(self) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(None)
    }

    /// Builds the executable graph with a checkpointer. Runs invoked with a
    /// `thread_id` save their final (or paused) state to it.
    pub fn compile_with_checkpointer(
        self,
        checkpointer: Arc<dyn Checkpointer<S>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        self.compile_internal(Some(checkpointer))
    }

    fn compile_internal(
        self,
        checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    ) -> Result<CompiledStateGraph<S>, CompilationError> {
        for (from, to) in &self.edges {
            if from != START && !self.nodes.contains_key(from) {
                return Err(CompilationError::NodeNotFound(from.clone()));
            }
            if to != END && !self.nodes.contains_key(to) {
                return Err(CompilationError::NodeNotFound(to.clone()));
            }
        }
        for (source, router) in &self.conditional_edges {
            if !self.nodes.contains_key(source) {
                return Err(CompilationError::NodeNotFound(source.clone()));
            }
            if let Some(ref path_map) = router.path_map {
                for target in path_map.values() {
                    if target != END && !self.nodes.contains_key(target) {
                        return Err(CompilationError::InvalidConditionalPathMap(target.clone()));
                    }
                }
            }
        }
        for id in &self.interrupt_before {
            if !self.nodes.contains_key(id) {
                return Err(CompilationError::NodeNotFound(id.clone()));
            }
        }

        let mut start_edges = self
            .edges
            .iter()
            .filter(|(f, _)| f == START)
            .map(|(_, t)| t.clone());
        let first = start_edges.next().ok_or(CompilationError::MissingStart)?;
        if start_edges.next().is_some() {
            return Err(CompilationError::InvalidChain(
                "multiple edges from START (branch)".into(),
            ));
        }

        let has_end = self.edges.iter().any(|(_, t)| t == END)
            || self.conditional_edges.values().any(|r| {
                r.path_map
                    .as_ref()
                    .map_or(true, |m| m.values().any(|v| v == END))
            });
        if !has_end {
            return Err(CompilationError::MissingEnd);
        }

        let mut next_map: HashMap<String, NextEntry<S>> = HashMap::new();
        for (from, to) in self.edges.iter().filter(|(f, _)| f.as_str() != START) {
            if next_map
                .insert(from.clone(), NextEntry::Unconditional(to.clone()))
                .is_some()
            {
                return Err(CompilationError::InvalidChain(format!(
                    "duplicate edge from {} (branch)",
                    from
                )));
            }
        }
        for (source, router) in &self.conditional_edges {
            if next_map.contains_key(source) {
                return Err(CompilationError::NodeHasBothEdgeAndConditional(
                    source.clone(),
                ));
            }
            next_map.insert(source.clone(), NextEntry::Conditional(router.clone()));
        }

        // Without a router nothing can break a cycle of plain edges.
        if self.conditional_edges.is_empty() {
            let mut visited = HashSet::new();
            let mut current = first.clone();
            while let Some(NextEntry::Unconditional(next)) = next_map.get(&current) {
                if !visited.insert(current.clone()) {
                    return Err(CompilationError::InvalidChain("cycle detected".into()));
                }
                if next == END {
                    break;
                }
                current = next.clone();
            }
        }

        Ok(CompiledStateGraph {
            nodes: self.nodes,
            first_node_id: first,
            next_map,
            checkpointer,
            interrupt_before: self.interrupt_before,
            retry_policy: self.retry_policy,
        })
    }
}
