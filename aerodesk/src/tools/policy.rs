//! `lookup_policy`: answers policy questions from the FAQ retriever.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::retrieval::PolicyRetriever;
use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_LOOKUP_POLICY: &str = "lookup_policy";

const TOP_K: usize = 2;

pub struct LookupPolicyTool {
    retriever: Arc<PolicyRetriever>,
}

impl LookupPolicyTool {
    pub fn new(retriever: Arc<PolicyRetriever>) -> Self {
        Self { retriever }
    }
}

#[async_trait]
impl Tool for LookupPolicyTool {
    fn name(&self) -> &str {
        TOOL_LOOKUP_POLICY
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_LOOKUP_POLICY.to_string(),
            description: Some(
                "Consult the company policies to check whether certain options are permitted. \
                 Use this before making any flight changes performing other 'write' events."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string" } },
                "required": ["query"]
            }),
        }
    }

    async fn call(
        &self,
        args: serde_json::Value,
        _ctx: Option<&ToolCallContext>,
    ) -> Result<ToolCallContent, ToolSourceError> {
        let query = args
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing query".into()))?;
        let hits = self
            .retriever
            .query(query, TOP_K)
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        let text = hits
            .into_iter()
            .map(|h| h.content)
            .collect::<Vec<_>>()
            .join("\n\n");
        Ok(ToolCallContent::new(text))
    }
}
