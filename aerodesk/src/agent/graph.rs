//! Support graph assembly.

use std::collections::HashMap;
use std::sync::Arc;

use crate::graph::{CompilationError, CompiledStateGraph, Node, StateGraph, END, START};
use crate::memory::Checkpointer;
use crate::state::SupportState;

use super::condition::tools_condition;

pub const FETCH_USER_INFO_NODE: &str = "fetch_user_info";
pub const ASSISTANT_NODE: &str = "assistant";
pub const TOOLS_NODE: &str = "tools";

/// Wires `START → fetch_user_info → assistant → (tools → assistant | END)` and compiles
/// it with `checkpointer`, pausing before `tools`.
pub fn build_support_graph(
    fetch_user_info: Arc<dyn Node<SupportState>>,
    assistant: Arc<dyn Node<SupportState>>,
    tools: Arc<dyn Node<SupportState>>,
    checkpointer: Arc<dyn Checkpointer<SupportState>>,
) -> Result<CompiledStateGraph<SupportState>, CompilationError> {
    let mut graph = StateGraph::<SupportState>::new();
    graph.add_node(FETCH_USER_INFO_NODE, fetch_user_info);
    graph.add_node(ASSISTANT_NODE, assistant);
    graph.add_node(TOOLS_NODE, tools);

    graph.add_edge(START, FETCH_USER_INFO_NODE);
    graph.add_edge(FETCH_USER_INFO_NODE, ASSISTANT_NODE);
    let path_map: HashMap<String, String> = [
        (TOOLS_NODE.to_string(), TOOLS_NODE.to_string()),
        (END.to_string(), END.to_string()),
    ]
    .into_iter()
    .collect();
    graph.add_conditional_edges(
        ASSISTANT_NODE,
        Arc::new(|state: &SupportState| tools_condition(state).as_str().to_string()),
        Some(path_map),
    );
    graph.add_edge(TOOLS_NODE, ASSISTANT_NODE);

    graph
        .with_interrupt_before([TOOLS_NODE])
        .compile_with_checkpointer(checkpointer)
}
