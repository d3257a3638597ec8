//! Tools step: run every tool call of the last assistant message.
//!
//! Each call yields one `Tool` message, in call order. With the default
//! [`HandleToolErrors::Always`], a failing call becomes an error message for the model
//! to read instead of failing the run.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::error::AgentError;
use crate::graph::{Next, Node, RunContext};
use crate::message::Message;
use crate::state::SupportState;
use crate::tool_source::{ToolCallContext, ToolSource, ToolSourceError};

use super::graph::TOOLS_NODE;

pub const DEFAULT_TOOL_ERROR_TEMPLATE: &str = "Error: {error}\n please fix your mistakes.";

pub type ErrorHandlerFn =
    Arc<dyn Fn(&ToolSourceError, &str, &Value) -> String + Send + Sync + 'static>;

/// What to do when a tool call fails.
#[derive(Clone)]
pub enum HandleToolErrors {
    /// Fail the run.
    Never,
    /// Reply with the given text, or [`DEFAULT_TOOL_ERROR_TEMPLATE`] when `None`.
    Always(Option<String>),
    /// Reply with the handler's text (error, tool name, arguments).
    Custom(ErrorHandlerFn),
}

impl Default for HandleToolErrors {
    fn default() -> Self {
        Self::Always(None)
    }
}

impl std::fmt::Debug for HandleToolErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Never => write!(f, "HandleToolErrors::Never"),
            Self::Always(msg) => write!(f, "HandleToolErrors::Always({:?})", msg),
            Self::Custom(_) => write!(f, "HandleToolErrors::Custom(<fn>)"),
        }
    }
}

fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

/// Blank arguments become `{}`; a JSON string holding JSON is unwrapped. Anything
/// else that is not valid JSON is an `InvalidInput` error and the tool is not run.
fn parse_tool_arguments(arguments: &str) -> Result<Value, ToolSourceError> {
    if arguments.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    let raw: Value = serde_json::from_str(arguments)
        .map_err(|e| ToolSourceError::InvalidInput(format!("arguments are not valid JSON: {}", e)))?;
    Ok(match raw.as_str() {
        Some(s) => serde_json::from_str(s).unwrap_or(raw),
        None => raw,
    })
}

pub struct ToolsNode {
    tools: Arc<dyn ToolSource>,
    handle_tool_errors: HandleToolErrors,
}

impl ToolsNode {
    pub fn new(tools: Arc<dyn ToolSource>) -> Self {
        Self {
            tools,
            handle_tool_errors: HandleToolErrors::default(),
        }
    }

    pub fn with_handle_tool_errors(mut self, handle_tool_errors: HandleToolErrors) -> Self {
        self.handle_tool_errors = handle_tool_errors;
        self
    }

    fn handle_error(&self, error: &ToolSourceError, tool_name: &str, args: &Value) -> Option<String> {
        match &self.handle_tool_errors {
            HandleToolErrors::Never => None,
            HandleToolErrors::Always(custom) => Some(custom.clone().unwrap_or_else(|| {
                DEFAULT_TOOL_ERROR_TEMPLATE.replace("{error}", &error.to_string())
            })),
            HandleToolErrors::Custom(handler) => Some(handler(error, tool_name, args)),
        }
    }

    async fn execute(
        &self,
        state: SupportState,
        ctx: Option<&ToolCallContext>,
    ) -> Result<(SupportState, Next), AgentError> {
        let calls = state.pending_tool_calls().to_vec();
        let mut state = state;
        for tc in &calls {
            let (result, args) = match parse_tool_arguments(&tc.arguments) {
                Ok(args) => {
                    debug!(tool = %tc.name, args = ?args, "Calling tool");
                    let result = self
                        .tools
                        .call_tool_with_context(&tc.name, args.clone(), ctx)
                        .await;
                    (result, args)
                }
                Err(e) => (Err(e), Value::String(tc.arguments.clone())),
            };
            let text = match result {
                Ok(content) => {
                    trace!(
                        tool = %tc.name,
                        result_len = content.text.len(),
                        result_preview = %truncate_for_log(&content.text, 200),
                        "Tool returned"
                    );
                    content.text
                }
                Err(e) => {
                    warn!(tool = %tc.name, error = %e, "Tool call failed");
                    self.handle_error(&e, &tc.name, &args)
                        .ok_or_else(|| AgentError::ExecutionFailed(e.to_string()))?
                }
            };
            state.messages.push(Message::tool(tc.id.clone(), text));
        }
        Ok((state, Next::Continue))
    }
}

#[async_trait]
impl Node<SupportState> for ToolsNode {
    fn id(&self) -> &str {
        TOOLS_NODE
    }

    async fn run(&self, state: SupportState) -> Result<(SupportState, Next), AgentError> {
        self.execute(state, None).await
    }

    async fn run_with_context(
        &self,
        state: SupportState,
        run_ctx: &RunContext,
    ) -> Result<(SupportState, Next), AgentError> {
        let ctx = ToolCallContext::from_config(&run_ctx.config);
        self.execute(state, Some(&ctx)).await
    }
}
