//! OpenAI-compatible Chat Completions client implementing `LlmClient` (ChatOpenAI).
//!
//! Talks to any endpoint that speaks the OpenAI chat-completions wire format; the
//! model factory points it at Gemini's OpenAI-compatible endpoint. Bound tools are
//! sent as function tools and `tool_calls` in the reply become [`ToolCall`]s.
//!
//! Assistant messages that carried tool calls and the matching tool messages are
//! sent back as such, so the model sees the full call/result exchange.
//!
//! Retries follow the client's [`RetryPolicy`]: transport failures are retried by
//! [`ChatOpenAI`] itself, 429 and 5xx responses by the async-openai client backoff
//! (the only layer that sees the status), bounded by the same policy. Other API
//! errors such as 400 or 401 fail at once.
//!
//! **Interaction**: Implements `LlmClient`; used by `AssistantRunnable`.

use async_trait::async_trait;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::error::AgentError;
use crate::graph::RetryPolicy;
use crate::llm::{LlmClient, LlmResponse};
use crate::message::Message;
use crate::state::ToolCall;
use crate::tool_source::ToolSpec;

use async_openai::{
    config::{Config, OpenAIConfig},
    error::OpenAIError,
    types::chat::{
        ChatCompletionMessageToolCalls, ChatCompletionRequestAssistantMessageArgs,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
        ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessage,
        ChatCompletionTool, ChatCompletionTools, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs, FunctionObject,
    },
    Client,
};
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

/// OpenAI-compatible chat client.
///
/// Build with [`ChatOpenAI::with_config`] and chain `with_tools`, `with_temperature`,
/// `with_retry_policy`. Transport failures, 429 and 5xx are retried according to the
/// retry policy.
pub struct ChatOpenAI {
    client: Client<OpenAIConfig>,
    api_base: String,
    model: String,
    tools: Option<Vec<ToolSpec>>,
    temperature: Option<f32>,
    retry_policy: RetryPolicy,
}

impl ChatOpenAI {
    /// Client with explicit config (API key, base URL).
    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let api_base = config.api_base().to_string();
        Self {
            client: Client::with_config(config).with_backoff(status_backoff(&RetryPolicy::None)),
            api_base,
            model: model.into(),
            tools: None,
            temperature: None,
            retry_policy: RetryPolicy::None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Sampling temperature (0–2).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Retries for failed API calls.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.client = self.client.with_backoff(status_backoff(&retry_policy));
        self.retry_policy = retry_policy;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> Option<f32> {
        self.temperature
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    fn tool_calls_to_request(
        tool_calls: &[ToolCall],
    ) -> Result<Vec<ChatCompletionMessageToolCalls>, AgentError> {
        let wire: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": { "name": tc.name, "arguments": tc.arguments },
                })
            })
            .collect();
        serde_json::from_value(serde_json::Value::Array(wire))
            .map_err(|e| AgentError::ExecutionFailed(format!("tool call encode failed: {}", e)))
    }

    /// Converts our messages to request messages, keeping tool calls and tool results.
    fn messages_to_request(
        messages: &[Message],
    ) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
        let build_err =
            |e: OpenAIError| AgentError::ExecutionFailed(format!("OpenAI message build failed: {}", e));
        messages
            .iter()
            .map(|m| {
                Ok(match m {
                    Message::System(s) => ChatCompletionRequestMessage::System(
                        ChatCompletionRequestSystemMessage::from(s.as_str()),
                    ),
                    Message::User(s) => ChatCompletionRequestMessage::User(
                        ChatCompletionRequestUserMessage::from(s.as_str()),
                    ),
                    Message::Assistant {
                        content,
                        tool_calls,
                    } => {
                        let mut builder = ChatCompletionRequestAssistantMessageArgs::default();
                        builder.content(content.as_str());
                        if !tool_calls.is_empty() {
                            builder.tool_calls(Self::tool_calls_to_request(tool_calls)?);
                        }
                        builder.build().map_err(build_err)?.into()
                    }
                    Message::Tool {
                        tool_call_id,
                        content,
                    } => ChatCompletionRequestToolMessageArgs::default()
                        .content(content.as_str())
                        .tool_call_id(tool_call_id.as_str())
                        .build()
                        .map_err(build_err)?
                        .into(),
                })
            })
            .collect()
    }

    fn build_request(&self, messages: &[Message]) -> Result<CreateChatCompletionRequest, AgentError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(self.model.clone());
        args.messages(Self::messages_to_request(messages)?);

        if let Some(ref tools) = self.tools {
            if !tools.is_empty() {
                let chat_tools: Vec<ChatCompletionTools> = tools
                    .iter()
                    .map(|t| {
                        ChatCompletionTools::Function(ChatCompletionTool {
                            function: FunctionObject {
                                name: t.name.clone(),
                                description: t.description.clone(),
                                parameters: Some(t.input_schema.clone()),
                                ..Default::default()
                            },
                        })
                    })
                    .collect();
                args.tools(chat_tools);
            }
        }

        if let Some(t) = self.temperature {
            args.temperature(t);
        }

        args.build()
            .map_err(|e| AgentError::ExecutionFailed(format!("OpenAI request build failed: {}", e)))
    }
}

/// Backoff for 429 and 5xx responses: same delays as `policy`, given up once its
/// total delay has elapsed. `RetryPolicy::None` gives up after the first response.
fn status_backoff(policy: &RetryPolicy) -> ExponentialBackoff {
    let multiplier = match policy {
        RetryPolicy::Exponential { multiplier, .. } => *multiplier,
        _ => 1.0,
    };
    let last_delay = policy.delay(policy.max_attempts().saturating_sub(1));
    ExponentialBackoffBuilder::new()
        .with_initial_interval(policy.delay(0))
        .with_randomization_factor(0.0)
        .with_multiplier(multiplier)
        .with_max_interval(last_delay.max(policy.delay(0)))
        .with_max_elapsed_time(Some(policy.total_delay()))
        .build()
}

/// Connection, timeout and body-read failures; no response status was seen.
fn is_transport_error(e: &OpenAIError) -> bool {
    matches!(e, OpenAIError::Reqwest(_))
}

#[async_trait]
impl LlmClient for ChatOpenAI {
    async fn invoke(&self, messages: &[Message]) -> Result<LlmResponse, AgentError> {
        let trace_id = Uuid::new_v4().to_string();
        let request = self.build_request(messages)?;

        let tools_count = self.tools.as_ref().map(|t| t.len()).unwrap_or(0);
        let url = self.chat_completions_url();
        debug!(
            trace_id = %trace_id,
            url = %url,
            model = %self.model,
            message_count = messages.len(),
            tools_count = tools_count,
            temperature = ?self.temperature,
            "OpenAI chat create"
        );
        if let Ok(js) = serde_json::to_string_pretty(&request) {
            trace!(trace_id = %trace_id, url = %url, request = %js, "OpenAI request body");
        }

        let mut attempt = 0;
        let response = loop {
            match self.client.chat().create(request.clone()).await {
                Ok(response) => break response,
                Err(e) if is_transport_error(&e) && self.retry_policy.should_retry(attempt) => {
                    let delay = self.retry_policy.delay(attempt);
                    warn!(
                        trace_id = %trace_id,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "OpenAI transport error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(AgentError::ExecutionFailed(format!("OpenAI API error: {}", e)))
                }
            }
        };

        if let Ok(js) = serde_json::to_string_pretty(&response) {
            trace!(trace_id = %trace_id, url = %url, response = %js, "OpenAI response body");
        }

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            AgentError::ExecutionFailed("OpenAI returned no choices".to_string())
        })?;

        let msg = choice.message;
        let content = msg.content.unwrap_or_default();
        let tool_calls: Vec<ToolCall> = msg
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tc| match tc {
                ChatCompletionMessageToolCalls::Function(f) => Some(ToolCall {
                    id: f.id,
                    name: f.function.name,
                    arguments: f.function.arguments,
                }),
                _ => None,
            })
            .collect();

        debug!(
            trace_id = %trace_id,
            content_len = content.len(),
            tool_calls = tool_calls.len(),
            "OpenAI chat response"
        );
        Ok(LlmResponse::with_tool_calls(content, tool_calls))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{read_http_request, write_http_response};
    use tokio::net::TcpListener;

    fn completion(message: serde_json::Value) -> String {
        serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1,
            "model": "gemini-2.0-flash-001",
            "choices": [{"index": 0, "message": message, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7}
        })
        .to_string()
    }

    fn config_for(addr: std::net::SocketAddr) -> OpenAIConfig {
        OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(format!("http://{}", addr))
    }

    /// **Scenario**: tool messages and prior tool calls are sent; reply tool calls are parsed.
    #[tokio::test]
    async fn invoke_round_trips_tool_calls() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_http_request(&mut stream).await;
            let body = completion(serde_json::json!({
                "role": "assistant",
                "content": null,
                "tool_calls": [{
                    "id": "call_9",
                    "type": "function",
                    "function": {"name": "search_flights", "arguments": "{\"limit\":2}"}
                }]
            }));
            write_http_response(&mut stream, "200 OK", &body).await;
            request
        });

        let spec = ToolSpec {
            name: "search_flights".into(),
            description: Some("Search flights".into()),
            input_schema: serde_json::json!({"type": "object", "properties": {}}),
        };
        let llm = ChatOpenAI::with_config(config_for(addr), "gemini-2.0-flash-001")
            .with_tools(vec![spec])
            .with_temperature(0.0);
        let history = vec![
            Message::system("sys"),
            Message::user("find flights"),
            Message::assistant_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "lookup_policy".into(),
                    arguments: "{}".into(),
                }],
            ),
            Message::tool("call_1", "policy text"),
        ];
        let resp = llm.invoke(&history).await.unwrap();
        assert_eq!(resp.content, "");
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].id, "call_9");
        assert_eq!(resp.tool_calls[0].name, "search_flights");

        let sent: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        let msgs = sent["messages"].as_array().unwrap();
        assert_eq!(msgs.len(), 4);
        assert_eq!(msgs[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(msgs[3]["role"], "tool");
        assert_eq!(msgs[3]["tool_call_id"], "call_1");
        assert_eq!(sent["tools"][0]["function"]["name"], "search_flights");
        assert_eq!(sent["temperature"], 0.0);
    }

    /// **Scenario**: a dropped connection is retried per the retry policy and then succeeds.
    #[tokio::test]
    async fn invoke_retries_after_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            drop(stream);
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            let body = completion(serde_json::json!({"role": "assistant", "content": "hello"}));
            write_http_response(&mut stream, "200 OK", &body).await;
        });

        let llm = ChatOpenAI::with_config(config_for(addr), "m")
            .with_retry_policy(RetryPolicy::fixed(1, std::time::Duration::ZERO));
        let resp = llm.invoke(&[Message::user("hi")]).await.unwrap();
        assert_eq!(resp.content, "hello");
        assert!(resp.tool_calls.is_empty());
        server.await.unwrap();
    }

    /// **Scenario**: a 503 is retried after the policy delay and then succeeds.
    #[tokio::test]
    async fn invoke_retries_after_server_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            write_http_response(&mut stream, "503 Service Unavailable", "overloaded").await;
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            let body = completion(serde_json::json!({"role": "assistant", "content": "hello"}));
            write_http_response(&mut stream, "200 OK", &body).await;
        });

        let llm = ChatOpenAI::with_config(config_for(addr), "m")
            .with_retry_policy(RetryPolicy::fixed(2, std::time::Duration::from_millis(50)));
        let resp = llm.invoke(&[Message::user("hi")]).await.unwrap();
        assert_eq!(resp.content, "hello");
        server.await.unwrap();
    }

    /// **Scenario**: a 400 fails at once even with retries left; no second request is made.
    #[tokio::test]
    async fn invoke_does_not_retry_client_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            write_http_response(
                &mut stream,
                "400 Bad Request",
                r#"{"error":{"message":"boom","type":"invalid_request_error","param":null,"code":null}}"#,
            )
            .await;
            tokio::time::timeout(std::time::Duration::from_millis(300), listener.accept())
                .await
                .is_err()
        });

        let llm = ChatOpenAI::with_config(config_for(addr), "m")
            .with_retry_policy(RetryPolicy::fixed(2, std::time::Duration::ZERO));
        match llm.invoke(&[Message::user("hi")]).await {
            Err(AgentError::ExecutionFailed(msg)) => assert!(msg.contains("boom"), "{}", msg),
            other => panic!("expected ExecutionFailed, got {:?}", other.map(|r| r.content)),
        }
        assert!(server.await.unwrap(), "400 was retried");
    }

    #[test]
    fn status_backoff_follows_policy() {
        let none = status_backoff(&RetryPolicy::None);
        assert_eq!(none.max_elapsed_time, Some(std::time::Duration::ZERO));

        let policy = RetryPolicy::model_backoff(3);
        let backoff = status_backoff(&policy);
        assert_eq!(backoff.initial_interval, std::time::Duration::from_millis(500));
        assert_eq!(backoff.max_interval, std::time::Duration::from_secs(2));
        assert_eq!(backoff.multiplier, 2.0);
        assert_eq!(backoff.max_elapsed_time, Some(std::time::Duration::from_millis(3500)));
    }

    /// **Scenario**: without retries an API error surfaces as ExecutionFailed.
    #[tokio::test]
    async fn invoke_without_retry_reports_api_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_http_request(&mut stream).await;
            write_http_response(
                &mut stream,
                "400 Bad Request",
                r#"{"error":{"message":"boom","type":"invalid_request_error","param":null,"code":null}}"#,
            )
            .await;
        });

        let llm = ChatOpenAI::with_config(config_for(addr), "m");
        match llm.invoke(&[Message::user("hi")]).await {
            Err(AgentError::ExecutionFailed(msg)) => assert!(msg.contains("OpenAI API error"), "{}", msg),
            other => panic!("expected ExecutionFailed, got {:?}", other.map(|r| r.content)),
        }
        server.await.unwrap();
    }
}
