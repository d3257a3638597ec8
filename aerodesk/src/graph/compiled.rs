//! Compiled state graph: invoke, resume after an interrupt, read the saved state.
//!
//! Built by `StateGraph::compile` or `compile_with_checkpointer`. When a checkpointer
//! is set and the config carries a `thread_id`, the state is saved after every node
//! with the next node as `pending_node`. A run that reaches an interrupt-before node
//! stops there and returns `AgentError::Interrupted`; a run that fails keeps the last
//! completed step, and `resume` continues from either.

use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::AgentError;
use crate::memory::{Checkpoint, CheckpointError, CheckpointSource, Checkpointer, RunnableConfig};

use super::interrupt::{GraphInterrupt, Interrupt};
use super::logging::{
    log_graph_complete, log_graph_error, log_graph_interrupt, log_graph_start, log_node_complete,
    log_node_start, log_node_state,
};
use super::retry::RetryPolicy;
use super::snapshot::StateSnapshot;
use super::state_graph::END;
use super::{Next, NextEntry, Node, RunContext};

/// Compiled graph: immutable structure, ready to run.
#[derive(Clone)]
pub struct CompiledStateGraph<S> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    /// First node to run (target of the START edge).
    pub(super) first_node_id: String,
    /// Node id -> how to pick its successor.
    pub(super) next_map: HashMap<String, NextEntry<S>>,
    pub(super) checkpointer: Option<Arc<dyn Checkpointer<S>>>,
    pub(super) interrupt_before: HashSet<String>,
    pub(super) retry_policy: RetryPolicy,
}

impl<S> CompiledStateGraph<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    async fn execute_node_with_retry(
        &self,
        node: Arc<dyn Node<S>>,
        state: S,
        run_ctx: &RunContext,
    ) -> Result<(S, Next), AgentError> {
        let mut attempt = 0;
        loop {
            match node.run_with_context(state.clone(), run_ctx).await {
                Ok(output) => return Ok(output),
                Err(e @ AgentError::Interrupted(_)) => return Err(e),
                Err(e) => {
                    if self.retry_policy.should_retry(attempt) {
                        let delay = self.retry_policy.delay(attempt);
                        tracing::warn!(
                            node_id = node.id(),
                            attempt = attempt + 1,
                            error = %e,
                            "node failed, retrying"
                        );
                        if delay > std::time::Duration::ZERO {
                            tokio::time::sleep(delay).await;
                        }
                        attempt += 1;
                        continue;
                    }
                    return Err(e);
                }
            }
        }
    }

    /// Saves `state` for the config's thread. No-op without checkpointer or thread_id.
    async fn save(
        &self,
        state: &S,
        config: &RunnableConfig,
        source: CheckpointSource,
        step: i64,
        pending_node: Option<&str>,
    ) -> Result<(), AgentError> {
        let (Some(cp), Some(_)) = (&self.checkpointer, config.thread_id.as_ref()) else {
            return Ok(());
        };
        let mut checkpoint = Checkpoint::from_state(state.clone(), source, step);
        if let Some(id) = pending_node {
            checkpoint = checkpoint.with_pending_node(id);
        }
        // Saves always append a new checkpoint; a pinned checkpoint_id only applies to reads.
        let write_config = RunnableConfig {
            checkpoint_id: None,
            ..config.clone()
        };
        cp.put(&write_config, &checkpoint).await?;
        Ok(())
    }

    fn resolve_next(&self, current_id: &str, state: &S, next: Next) -> Option<String> {
        match self.next_map.get(current_id) {
            Some(NextEntry::Conditional(router)) => {
                let target = router.resolve_next(state);
                tracing::debug!(from = %current_id, to = %target, "conditional routing");
                Some(target)
            }
            entry => match next {
                Next::End => None,
                Next::Node(id) => Some(id),
                Next::Continue => match entry {
                    Some(NextEntry::Unconditional(id)) => Some(id.clone()),
                    _ => None,
                },
            },
        }
    }

    /// Steps through nodes starting at `current_id` until END or an interrupt.
    ///
    /// After every node the state is saved with its successor as `pending_node`, so a
    /// failure later in the run leaves the thread at the last completed step. When
    /// `resuming` is true the state came from a checkpoint and the interrupt check is
    /// skipped for the first node only.
    async fn run_loop(
        &self,
        state: &mut S,
        config: &RunnableConfig,
        mut current_id: String,
        mut step: i64,
        mut resuming: bool,
    ) -> Result<(), AgentError> {
        let thread_id = config.thread_id.as_deref();
        log_graph_start(thread_id);
        let run_ctx = RunContext::new(config.clone());
        // State not yet written for `current_id`.
        let mut unsaved = !resuming;

        loop {
            let skip_interrupt = std::mem::take(&mut resuming);
            if !skip_interrupt && self.interrupt_before.contains(&current_id) {
                if unsaved {
                    self.save(state, config, CheckpointSource::Loop, step, Some(&current_id))
                        .await?;
                }
                log_graph_interrupt(&current_id, thread_id);
                return Err(GraphInterrupt(Interrupt::before_node(&current_id)).into());
            }

            let node = self.nodes.get(&current_id).cloned().ok_or_else(|| {
                AgentError::ExecutionFailed(format!("node not found: {}", current_id))
            })?;

            log_node_start(&current_id);
            log_node_state(&current_id, state);

            let result = self
                .execute_node_with_retry(node, state.clone(), &run_ctx.at_step(step))
                .await;
            let (new_state, next) = match result {
                Ok(output) => output,
                Err(e) => {
                    log_graph_error(&e);
                    return Err(e);
                }
            };
            log_node_complete(&current_id, &next);
            *state = new_state;
            step += 1;

            match self.resolve_next(&current_id, state, next) {
                Some(id) if id != END => {
                    self.save(state, config, CheckpointSource::Loop, step, Some(&id))
                        .await?;
                    unsaved = false;
                    current_id = id;
                }
                _ => {
                    self.save(state, config, CheckpointSource::Loop, step, None)
                        .await?;
                    log_graph_complete(thread_id);
                    return Ok(());
                }
            }
        }
    }

    /// Runs the graph from its first node with `state`.
    ///
    /// With a checkpointer and `config.thread_id`, the state is saved after every node
    /// and at the end. If a node listed in interrupt-before is reached, the run stops
    /// with that node pending and returns `AgentError::Interrupted`; call
    /// [`resume`](Self::resume) to go on.
    pub async fn invoke(&self, state: S, config: Option<RunnableConfig>) -> Result<S, AgentError> {
        if !self.nodes.contains_key(&self.first_node_id) {
            return Err(AgentError::ExecutionFailed("empty graph".into()));
        }
        let config = config.unwrap_or_default();
        let mut state = state;
        self.run_loop(&mut state, &config, self.first_node_id.clone(), 0, false)
            .await?;
        Ok(state)
    }

    /// Continues a thread at its pending node: after an interrupt, or after a node
    /// failed mid-run.
    ///
    /// Loads the latest checkpoint (or `config.checkpoint_id`) and runs the pending node
    /// without re-checking its interrupt. Later interrupt-before nodes still pause.
    pub async fn resume(&self, config: RunnableConfig) -> Result<S, AgentError> {
        let snapshot = self.get_state(&config).await?.ok_or_else(|| {
            CheckpointError::NotFound(config.thread_id.clone().unwrap_or_default())
        })?;
        let pending = snapshot
            .next
            .ok_or_else(|| AgentError::ExecutionFailed("thread has nothing to resume".into()))?;
        tracing::info!(
            thread_id = config.thread_id.as_deref().unwrap_or(""),
            node_id = %pending,
            "Resuming graph"
        );
        let mut state = snapshot.values;
        self.run_loop(&mut state, &config, pending, snapshot.step, true)
            .await?;
        Ok(state)
    }

    /// Latest saved state of the thread, or `None` when it has no checkpoint.
    ///
    /// Errors when the graph has no checkpointer or the config has no thread_id.
    pub async fn get_state(
        &self,
        config: &RunnableConfig,
    ) -> Result<Option<StateSnapshot<S>>, AgentError> {
        let cp = self.checkpointer.as_ref().ok_or_else(|| {
            AgentError::ExecutionFailed("graph was compiled without a checkpointer".into())
        })?;
        let found = cp.get_tuple(config).await?;
        Ok(found.map(|(checkpoint, metadata)| StateSnapshot {
            interrupted: checkpoint
                .pending_node
                .as_ref()
                .is_some_and(|id| self.interrupt_before.contains(id)),
            values: checkpoint.channel_values,
            next: checkpoint.pending_node,
            checkpoint_id: checkpoint.id,
            step: metadata.step,
        }))
    }

    /// Checkpointer the graph was compiled with.
    pub fn checkpointer(&self) -> Option<&Arc<dyn Checkpointer<S>>> {
        self.checkpointer.as_ref()
    }
}
