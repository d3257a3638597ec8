use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSource, ToolSourceError, ToolSpec};
use crate::tools::r#trait::Tool;

/// Ordered collection of tools exposed as one [`ToolSource`].
///
/// `list_tools` returns specs in registration order, which is the order the model sees
/// them in. Registering a tool whose name is already taken replaces it in place.
///
/// ```no_run
/// use aerodesk::tools::{AggregateToolSource, SearchFlightsTool, TravelDb};
/// use aerodesk::ToolSource;
///
/// # #[tokio::main]
/// # async fn main() {
/// let db = TravelDb::new("travel2.sqlite");
/// let mut source = AggregateToolSource::new();
/// source.register(Box::new(SearchFlightsTool::new(db)));
/// assert_eq!(source.list_tools().await.unwrap().len(), 1);
/// # }
/// ```
#[derive(Default, Clone)]
pub struct AggregateToolSource {
    tools: Vec<Arc<dyn Tool>>,
}

impl AggregateToolSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let tool: Arc<dyn Tool> = Arc::from(tool);
        match self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            Some(slot) => *slot = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    fn find(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolSourceError> {
        self.tools
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| ToolSourceError::NotFound(name.to_string()))
    }
}

#[async_trait]
impl ToolSource for AggregateToolSource {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>, ToolSourceError> {
        Ok(self.tools.iter().map(|t| t.spec()).collect())
    }

    async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
    ) -> Result<ToolCallContent, ToolSourceError> {
        self.call_tool_with_context(name, arguments, None).await
    }

    async fn call_tool_with_context(
        &self,
        name: &str,
        arguments: Value,
        ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let tool = self.find(name)?;
        tracing::debug!(tool = name, "calling tool");
        tool.call(arguments, ctx).await
    }
}
