//! Tool source abstraction: list tools and call a tool.
//!
//! The tools node depends on `ToolSource` instead of a concrete registry; the support
//! agent uses [`AggregateToolSource`](crate::tools::AggregateToolSource), tests may plug
//! in any other implementation.

mod context;

pub use context::ToolCallContext;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Tool specification sent to the model (name, description, JSON Schema of arguments).
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolSpec {
    pub name: String,
    /// Human-readable description for the LLM.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Result of a single tool call; becomes the content of a `Tool` message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallContent {
    pub text: String,
}

impl ToolCallContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Errors from listing or calling tools.
///
/// The tools node turns any of these into an error tool message instead of failing the run.
#[derive(Debug, Error)]
pub enum ToolSourceError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid arguments: {0}")]
    InvalidInput(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<rusqlite::Error> for ToolSourceError {
    fn from(e: rusqlite::Error) -> Self {
        ToolSourceError::Database(e.to_string())
    }
}

/// Tool source: list tools and call a tool.
///
/// The assistant binds `list_tools()` to the model; the tools node calls
/// `call_tool_with_context` once per requested call.
#[async_trait]
pub trait ToolSource: Send + Sync {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError>;

    /// Call a tool by name with JSON arguments.
    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError>;

    /// Call a tool with per-run context (passenger and thread).
    /// Default implementation ignores `ctx` and calls `call_tool(name, arguments)`.
    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let _ = ctx;
        self.call_tool(name, arguments).await
    }
}
