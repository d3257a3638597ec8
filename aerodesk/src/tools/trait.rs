use async_trait::async_trait;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};

/// A single callable tool: its name, the [`ToolSpec`] bound to the model, and the call itself.
///
/// Implementations are registered on an [`AggregateToolSource`](super::AggregateToolSource).
/// `ctx` carries the signed-in passenger; tools that act on tickets must read it from
/// there rather than from the model's arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn spec(&self) -> ToolSpec;

    async fn call(
        &self,
        args: serde_json::Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError>;
}
