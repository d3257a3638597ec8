//! `tavily_search_results_json`: web search through the Tavily API.

use async_trait::async_trait;
use serde_json::json;

use crate::tool_source::{ToolCallContent, ToolCallContext, ToolSourceError, ToolSpec};
use crate::tools::Tool;

pub const TOOL_TAVILY_SEARCH: &str = "tavily_search_results_json";

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";
const MAX_RESULTS: u64 = 1;

fn tavily_search_url() -> String {
    std::env::var("TAVILY_SEARCH_URL").unwrap_or_else(|_| TAVILY_SEARCH_URL.to_string())
}

/// Keeps `url` and `content` of each result, the shape the model is prompted with.
fn format_results(value: &serde_json::Value) -> serde_json::Value {
    let results: Vec<serde_json::Value> = value
        .get("results")
        .and_then(|r| r.as_array())
        .map(|items| {
            items
                .iter()
                .map(|r| {
                    json!({
                        "url": r.get("url").and_then(|u| u.as_str()).unwrap_or(""),
                        "content": r.get("content").and_then(|c| c.as_str()).unwrap_or(""),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    serde_json::Value::Array(results)
}

pub struct TavilySearchTool {
    api_key: String,
    client: reqwest::Client,
}

impl TavilySearchTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Tool for TavilySearchTool {
    fn name(&self) -> &str {
        TOOL_TAVILY_SEARCH
    }

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TOOL_TAVILY_SEARCH.to_string(),
            description: Some(
                "A search engine optimized for comprehensive, accurate, and trusted results. \
                 Useful for when you need to answer questions about current events. \
                 Input should be a search query."
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": { "query": { "type": "string", "description": "search query to look up" } },
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
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| ToolSourceError::InvalidInput("missing query".into()))?;

        let body = json!({
            "api_key": self.api_key,
            "query": query,
            "max_results": MAX_RESULTS,
            "search_depth": "advanced",
        });
        let res = self
            .client
            .post(tavily_search_url())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        if !res.status().is_success() {
            let status = res.status();
            let err_body = res.text().await.unwrap_or_default();
            return Err(ToolSourceError::Transport(format!(
                "Tavily API error {}: {}",
                status, err_body
            )));
        }
        let out: serde_json::Value = res
            .json()
            .await
            .map_err(|e| ToolSourceError::Transport(e.to_string()))?;
        Ok(ToolCallContent::new(format_results(&out).to_string()))
    }
}
