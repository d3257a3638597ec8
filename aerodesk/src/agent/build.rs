//! Builds a [`SupportRunner`] from [`SupportConfig`] and [`ModelSettings`].

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::graph::CompilationError;
use crate::llm::LlmClient;
use crate::memory::{CheckpointError, Checkpointer, JsonSerializer, MemorySaver, SqliteSaver};
use crate::model::{build_embedding_model, build_llm, ModelSettings};
use crate::retrieval::PolicyRetriever;
use crate::state::SupportState;
use crate::tool_source::{ToolSource, ToolSourceError};
use crate::tools::{support_tools, TravelDb};

use super::assistant::{AssistantNode, AssistantRunnable};
use super::graph::build_support_graph;
use super::prompt::AssistantPrompt;
use super::runner::SupportRunner;
use super::tools_node::ToolsNode;
use super::user_info::FetchUserInfoNode;

pub const DEFAULT_DB_PATH: &str = "travel2.sqlite";
pub const DEFAULT_POLICY_PATH: &str = "swiss_faq.md";

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no API key: set AERODESK_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY")]
    NoApiKey,
    #[error("travel database not found: {0}")]
    MissingDatabase(PathBuf),
    #[error("cannot read policy document {path}: {source}")]
    Policy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("tools: {0}")]
    Tools(#[from] ToolSourceError),
    #[error("checkpointer: {0}")]
    Checkpoint(#[from] CheckpointError),
    #[error("graph compilation failed: {0}")]
    Compilation(#[from] CompilationError),
}

/// Paths, keys and the signed-in passenger for one runner.
#[derive(Clone, Debug)]
pub struct SupportConfig {
    pub db_path: PathBuf,
    pub policy_path: PathBuf,
    /// SQLite checkpoint file; in-memory checkpoints when `None`.
    pub checkpoint_db: Option<PathBuf>,
    /// Enables the web search tool.
    pub tavily_api_key: Option<String>,
    pub passenger_id: Option<String>,
    /// Cap on empty-reply re-prompts; unbounded when `None`.
    pub max_reprompts: Option<usize>,
}

impl Default for SupportConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            policy_path: PathBuf::from(DEFAULT_POLICY_PATH),
            checkpoint_db: None,
            tavily_api_key: None,
            passenger_id: None,
            max_reprompts: None,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// A value that is not a count is logged and ignored, leaving re-prompts unbounded.
fn parse_max_reprompts(value: Option<String>) -> Option<usize> {
    let value = value?;
    match value.trim().parse() {
        Ok(n) => Some(n),
        Err(e) => {
            warn!(
                value = %value,
                error = %e,
                "AERODESK_MAX_REPROMPTS is not a count; re-prompts stay unbounded"
            );
            None
        }
    }
}

impl SupportConfig {
    /// Reads `AERODESK_DB`, `AERODESK_POLICY_FILE`, `AERODESK_CHECKPOINT_DB`,
    /// `TAVILY_API_KEY`, `AERODESK_PASSENGER_ID` and `AERODESK_MAX_REPROMPTS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: env_nonempty("AERODESK_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            policy_path: env_nonempty("AERODESK_POLICY_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.policy_path),
            checkpoint_db: env_nonempty("AERODESK_CHECKPOINT_DB").map(PathBuf::from),
            tavily_api_key: env_nonempty("TAVILY_API_KEY"),
            passenger_id: env_nonempty("AERODESK_PASSENGER_ID"),
            max_reprompts: parse_max_reprompts(env_nonempty("AERODESK_MAX_REPROMPTS")),
        }
    }

    pub fn with_passenger_id(mut self, passenger_id: impl Into<String>) -> Self {
        self.passenger_id = Some(passenger_id.into());
        self
    }
}

fn build_checkpointer(
    config: &SupportConfig,
) -> Result<Arc<dyn Checkpointer<SupportState>>, BuildError> {
    Ok(match &config.checkpoint_db {
        Some(path) => Arc::new(SqliteSaver::<SupportState>::new(path, Arc::new(JsonSerializer))?),
        None => Arc::new(MemorySaver::<SupportState>::new()),
    })
}

/// Assembles the runner from an already-built model and tool source.
pub fn build_support_runner_with(
    config: &SupportConfig,
    llm: Arc<dyn LlmClient>,
    tools: Arc<dyn ToolSource>,
) -> Result<SupportRunner, BuildError> {
    let db = TravelDb::new(&config.db_path);
    let assistant = AssistantNode::new(AssistantRunnable::new(AssistantPrompt::new(), llm))
        .with_max_reprompts(config.max_reprompts);
    let graph = build_support_graph(
        Arc::new(FetchUserInfoNode::new(db)),
        Arc::new(assistant),
        Arc::new(ToolsNode::new(tools)),
        build_checkpointer(config)?,
    )?;
    Ok(SupportRunner::new(graph, config.passenger_id.clone()))
}

/// Builds the tools, the tool-bound chat model and the graph.
pub async fn build_support_runner(
    config: &SupportConfig,
    settings: &ModelSettings,
) -> Result<SupportRunner, BuildError> {
    if !config.db_path.exists() {
        return Err(BuildError::MissingDatabase(config.db_path.clone()));
    }
    let db = TravelDb::new(&config.db_path);
    let embedder = Arc::new(build_embedding_model(settings)?);
    let retriever = PolicyRetriever::from_file(&config.policy_path, embedder).map_err(|source| {
        BuildError::Policy {
            path: config.policy_path.clone(),
            source,
        }
    })?;
    let tools = support_tools(&db, Arc::new(retriever), config.tavily_api_key.as_deref());
    let specs = tools.list_tools().await?;
    tracing::info!(tools = ?tools.names(), model = %settings.chat_model, "building support agent");
    let llm = build_llm(settings)?.with_tools(specs);
    build_support_runner_with(config, Arc::new(llm), Arc::new(tools))
}
