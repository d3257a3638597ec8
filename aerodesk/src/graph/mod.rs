//! State graph: nodes, edges and conditional edges; compile, invoke, resume.

mod compile_error;
mod compiled;
mod conditional;
mod interrupt;
mod logging;
mod next;
mod node;
mod retry;
mod run_context;
mod snapshot;
mod state_graph;

pub use compile_error::CompilationError;
pub use compiled::CompiledStateGraph;
pub use conditional::{ConditionalRouter, ConditionalRouterFn, NextEntry};
pub use interrupt::{GraphInterrupt, Interrupt};
pub use next::Next;
pub use node::Node;
pub use retry::RetryPolicy;
pub use run_context::RunContext;
pub use snapshot::StateSnapshot;
pub use state_graph::{StateGraph, END, START};
