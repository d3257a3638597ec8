//! In-memory retriever over the airline's policy FAQ.
//!
//! The markdown is split into sections before every `\n##` heading. Sections are
//! embedded once, on the first query, and ranked by cosine similarity.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::retrieval::{EmbedError, Embedder};

/// One policy section and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSection {
    pub content: String,
    pub similarity: f32,
}

/// Splits markdown before each `\n##`, keeping the heading with the section it opens.
pub fn split_sections(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut from = 0;
    while let Some(pos) = text[from..].find("\n##") {
        let cut = from + pos;
        if cut > start {
            out.push(text[start..cut].to_string());
        }
        start = cut;
        from = cut + 1;
    }
    if start < text.len() {
        out.push(text[start..].to_string());
    }
    out.retain(|s| !s.trim().is_empty());
    out
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut na, mut nb) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

pub struct PolicyRetriever {
    embedder: Arc<dyn Embedder>,
    sections: Vec<String>,
    index: OnceCell<Vec<Vec<f32>>>,
}

impl PolicyRetriever {
    pub fn from_markdown(text: &str, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            sections: split_sections(text),
            index: OnceCell::new(),
        }
    }

    pub fn from_file(path: impl AsRef<Path>, embedder: Arc<dyn Embedder>) -> std::io::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_markdown(&text, embedder))
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    async fn index(&self) -> Result<&Vec<Vec<f32>>, EmbedError> {
        self.index
            .get_or_try_init(|| async {
                let texts: Vec<&str> = self.sections.iter().map(String::as_str).collect();
                tracing::info!(sections = texts.len(), "embedding policy sections");
                let vectors = self.embedder.embed(&texts).await?;
                if vectors.len() != texts.len() {
                    return Err(EmbedError::InvalidResponse(format!(
                        "expected {} section vectors, got {}",
                        texts.len(),
                        vectors.len()
                    )));
                }
                Ok(vectors)
            })
            .await
    }

    /// Returns the `k` sections most similar to `query`, best first.
    pub async fn query(&self, query: &str, k: usize) -> Result<Vec<ScoredSection>, EmbedError> {
        if self.sections.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let index = self.index().await?;
        let query_vec = self
            .embedder
            .embed(&[query])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::InvalidResponse("no vector for query".into()))?;

        let mut scored: Vec<(usize, f32)> = index
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine(&query_vec, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(i, similarity)| ScoredSection {
                content: self.sections[i].clone(),
                similarity,
            })
            .collect())
    }
}
