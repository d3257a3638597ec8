//! # Aerodesk
//!
//! A customer-support agent for an airline, built as a small state graph with a
//! **state-in, state-out** design: one [`SupportState`] flows through every node.
//!
//! ## Graph
//!
//! ```text
//! START -> fetch_user_info -> assistant --tools_condition--> tools | END
//!                                 ^                            |
//!                                 +----------------------------+
//! ```
//!
//! - `fetch_user_info` loads the passenger's tickets once per run into `user_info`.
//! - `assistant` renders the support prompt and calls the model; an empty reply with no
//!   tool call is re-prompted until the model produces something usable.
//! - `tools` runs the requested tools. The graph is compiled with a checkpointer and
//!   pauses **before** this node so a human can approve or deny the calls.
//!
//! ## Main modules
//!
//! - [`graph`]: [`StateGraph`], [`CompiledStateGraph`], [`Node`], [`Next`]; interrupt-before and resume.
//! - [`memory`]: [`Checkpointer`], [`MemorySaver`], [`SqliteSaver`], [`RunnableConfig`].
//! - [`llm`]: [`LlmClient`], [`ChatOpenAI`], [`MockLlm`].
//! - [`retrieval`]: [`Embedder`], [`OpenAIEmbedder`], [`PolicyRetriever`].
//! - [`tools`] / [`tool_source`]: travel database tools, policy lookup, web search.
//! - [`agent`]: assistant wrapper, prompt, graph assembly, [`SupportRunner`].
//! - [`model`]: [`build_llm`], [`build_embedding_model`] from [`ModelSettings`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use aerodesk::{build_support_runner, ModelSettings, SupportConfig, TurnOutcome};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ModelSettings::from_env();
//! let config = SupportConfig::from_env().with_passenger_id("3442 587242");
//! let runner = build_support_runner(&config, &settings).await?;
//!
//! match runner.send("thread-1", "Hi there, what time is my flight?").await? {
//!     TurnOutcome::Reply(text) => println!("{}", text),
//!     TurnOutcome::AwaitingApproval(calls) => println!("approve? {:?}", calls),
//! }
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod message;
pub mod model;
pub mod retrieval;
pub mod state;
pub mod tool_source;
pub mod tools;

#[cfg(test)]
mod test_http;

pub use agent::{
    build_support_graph, build_support_runner, build_support_runner_with, tools_condition, AssistantNode, AssistantPrompt,
    AssistantRunnable, BuildError, FetchUserInfoNode, HandleToolErrors, SupportConfig,
    SupportRunner, ToolsConditionResult, ToolsNode, TurnOutcome, ASSISTANT_NODE,
    FETCH_USER_INFO_NODE, TOOLS_NODE,
};
pub use error::AgentError;
pub use graph::{
    CompilationError, CompiledStateGraph, GraphInterrupt, Interrupt, Next, Node, RetryPolicy,
    RunContext, StateGraph, StateSnapshot, END, START,
};
pub use llm::{ChatOpenAI, LlmClient, LlmResponse, MockLlm};
pub use memory::{
    Checkpoint, CheckpointError, CheckpointListItem, CheckpointMetadata, CheckpointSource,
    Checkpointer, JsonSerializer, MemorySaver, RunnableConfig, Serializer, SqliteSaver,
};
pub use message::Message;
pub use model::{build_embedding_model, build_llm, ModelSettings};
pub use retrieval::{EmbedError, Embedder, OpenAIEmbedder, PolicyRetriever, ScoredSection};
pub use state::{SupportState, ToolCall};
pub use tool_source::{ToolCallContent, ToolCallContext, ToolSource, ToolSourceError, ToolSpec};
pub use tools::{support_tools, AggregateToolSource, Tool, TravelDb};

/// When running `cargo test -p aerodesk`, initializes tracing from `RUST_LOG` so that
/// unit tests in `src/**` can print logs with `--nocapture`.
#[cfg(test)]
mod test_logging {
    use ctor::ctor;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::Layer;

    #[ctor]
    fn init() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_filter(filter),
            )
            .try_init();
    }
}
