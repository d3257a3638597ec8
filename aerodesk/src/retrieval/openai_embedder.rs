//! OpenAI-compatible embeddings client implementing [`Embedder`].
//!
//! Works against any endpoint that speaks the OpenAI `/embeddings` API, including the
//! Gemini compatibility layer that serves `text-embedding-004`.

use async_openai::{
    config::OpenAIConfig,
    types::embeddings::{CreateEmbeddingRequest, EmbeddingInput},
    Client,
};

use crate::retrieval::{EmbedError, Embedder};

/// Embeddings client. One HTTP request per [`embed`](Embedder::embed) call.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Uses `OPENAI_API_KEY` / `OPENAI_BASE_URL` from the environment.
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_config(OpenAIConfig::new(), model)
    }

    pub fn with_config(config: OpenAIConfig, model: impl Into<String>) -> Self {
        let model = model.into();
        let dimensions = Self::get_model_dimensions(&model);
        Self {
            client: Client::with_config(config),
            model,
            dimensions,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn get_model_dimensions(model: &str) -> usize {
        match model.trim_start_matches("models/") {
            "text-embedding-004" | "text-embedding-005" => 768,
            "text-embedding-3-large" => 3072,
            _ => 1536,
        }
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAIEmbedder {
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let inputs: Vec<String> = texts.iter().map(|&s| s.to_string()).collect();
        let input = if inputs.len() == 1 {
            EmbeddingInput::String(inputs[0].clone())
        } else {
            EmbeddingInput::StringArray(inputs)
        };
        let request = CreateEmbeddingRequest {
            input,
            model: self.model.clone(),
            ..Default::default()
        };

        tracing::debug!(model = %self.model, count = texts.len(), "embedding request");
        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let mut data = response.data;
        if data.len() != texts.len() {
            return Err(EmbedError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.len()
            )));
        }
        data.sort_by_key(|e| e.index);
        Ok(data.into_iter().map(|e| e.embedding).collect())
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_http::{read_http_request, write_http_response};
    use tokio::net::TcpListener;

    #[test]
    fn model_dimensions() {
        assert_eq!(OpenAIEmbedder::get_model_dimensions("text-embedding-004"), 768);
        assert_eq!(OpenAIEmbedder::get_model_dimensions("models/text-embedding-004"), 768);
        assert_eq!(OpenAIEmbedder::get_model_dimensions("text-embedding-3-large"), 3072);
        assert_eq!(OpenAIEmbedder::get_model_dimensions("unknown-model"), 1536);
    }

    /// **Scenario**: a batch request returns vectors in input order even when the
    /// server lists them out of order.
    #[tokio::test]
    async fn embed_batch_against_local_mock_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let request = read_http_request(&mut stream).await;
            let body = serde_json::json!({
                "object": "list",
                "data": [
                    {"object": "embedding", "index": 1, "embedding": [0.0, 1.0]},
                    {"object": "embedding", "index": 0, "embedding": [1.0, 0.0]}
                ],
                "model": "text-embedding-004",
                "usage": {"prompt_tokens": 2, "total_tokens": 2}
            })
            .to_string();
            write_http_response(&mut stream, "200 OK", &body).await;
            request
        });

        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base(format!("http://{}", addr));
        let embedder = OpenAIEmbedder::with_config(config, "text-embedding-004");
        let vectors = embedder.embed(&["baggage", "refunds"]).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
        assert_eq!(embedder.dimension(), 768);

        let request: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
        assert_eq!(request["model"], "text-embedding-004");
        assert_eq!(request["input"], serde_json::json!(["baggage", "refunds"]));
    }

    #[tokio::test]
    async fn embed_nothing_makes_no_request() {
        let embedder = OpenAIEmbedder::with_config(
            OpenAIConfig::new().with_api_base("http://127.0.0.1:9"),
            "text-embedding-004",
        );
        assert!(embedder.embed(&[]).await.unwrap().is_empty());
    }
}
