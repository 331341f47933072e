//! Nearest-neighbour retrieval over the embeddings store.

use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::{Context, Result};
use docent_core::EmbeddingRecord;
use tracing::debug;

use crate::embeddings::EmbeddingProvider;
use crate::store::EmbeddingStore;

pub const DEFAULT_TOP_K: usize = 3;

/// Cosine similarity between two vectors.
///
/// Zero magnitude, mismatched dimensions and non-finite results all score 0.
pub fn cosine_similarity(v1: &[f32], v2: &[f32]) -> f32 {
    if v1.len() != v2.len() || v1.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = v1.iter().zip(v2.iter()).map(|(a, b)| a * b).sum();
    let norm_a: f32 = v1.iter().map(|a| a * a).sum::<f32>().sqrt();
    let norm_b: f32 = v2.iter().map(|b| b * b).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let score = dot_product / (norm_a * norm_b);
    if score.is_finite() { score } else { 0.0 }
}

/// Score every record against `query` and keep the best `top_k`, highest
/// first. Equal scores keep store order.
pub fn rank<'a>(query: &[f32], records: &'a [EmbeddingRecord], top_k: usize) -> Vec<(&'a EmbeddingRecord, f32)> {
    let mut scored: Vec<(&EmbeddingRecord, f32)> = records
        .iter()
        .map(|r| (r, cosine_similarity(query, &r.embedding)))
        .collect();

    // `sort_by` is stable.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(top_k);
    scored
}

pub struct Retriever {
    store: Arc<EmbeddingStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
}

impl Retriever {
    pub fn new(store: Arc<EmbeddingStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            store,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn store(&self) -> &Arc<EmbeddingStore> {
        &self.store
    }

    /// Texts of the `top_k` records most similar to `query`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>> {
        self.retrieve_k(query, self.top_k).await
    }

    pub async fn retrieve_k(&self, query: &str, top_k: usize) -> Result<Vec<String>> {
        let vector = self
            .embedder
            .embed(query)
            .await
            .with_context(|| format!("Failed to embed query with {}", self.embedder.name()))?;

        let records = self.store.snapshot().await;
        let ranked = rank(&vector, &records, top_k);
        debug!(
            candidates = records.len(),
            returned = ranked.len(),
            best = ranked.first().map(|(_, s)| *s).unwrap_or(0.0),
            "Retrieved context"
        );
        Ok(ranked.into_iter().map(|(r, _)| r.text.clone()).collect())
    }
}
