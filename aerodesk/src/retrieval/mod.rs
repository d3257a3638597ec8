//! Embeddings and the policy-document retriever behind `lookup_policy`.

mod openai_embedder;
mod policy;

pub use openai_embedder::OpenAIEmbedder;
pub use policy::{split_sections, PolicyRetriever, ScoredSection};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("embedding response invalid: {0}")]
    InvalidResponse(String),
}

/// Turns text into vectors for similarity search.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embeds each text into a vector of dimension [`Embedder::dimension`].
    /// Returns one vector per input text in the same order.
    async fn embed(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Vector dimension returned by [`Embedder::embed`].
    fn dimension(&self) -> usize;
}
