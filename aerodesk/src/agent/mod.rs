//! Support agent: prompt, assistant wrapper, tools step, graph and runner.
//!
//! # Main types
//!
//! - **[`AssistantNode`]**: prompt | model, re-prompted on empty replies.
//! - **[`FetchUserInfoNode`]**: loads the passenger's tickets into `user_info`.
//! - **[`ToolsNode`]**: runs pending tool calls; errors become tool messages.
//! - **[`build_support_graph`]**: wires the nodes and pauses before `tools`.
//! - **[`SupportRunner`]**: one call per user turn with approve/deny.
//! - **[`build_support_runner`]**: everything above from [`SupportConfig`] and
//!   [`ModelSettings`](crate::model::ModelSettings).

mod assistant;
mod build;
mod condition;
mod graph;
mod prompt;
mod runner;
mod tools_node;
mod user_info;

pub use assistant::{AssistantNode, AssistantRunnable, REPROMPT_MESSAGE};
pub use build::{
    build_support_runner, build_support_runner_with, BuildError, SupportConfig, DEFAULT_DB_PATH,
    DEFAULT_POLICY_PATH,
};
pub use condition::{tools_condition, ToolsConditionResult};
pub use graph::{build_support_graph, ASSISTANT_NODE, FETCH_USER_INFO_NODE, TOOLS_NODE};
pub use prompt::{AssistantPrompt, SUPPORT_SYSTEM_TEMPLATE};
pub use runner::{SupportRunner, TurnOutcome};
pub use tools_node::{ErrorHandlerFn, HandleToolErrors, ToolsNode, DEFAULT_TOOL_ERROR_TEMPLATE};
pub use user_info::FetchUserInfoNode;
