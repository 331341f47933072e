//! Deterministic embedding backends for tests.

use anyhow::Result;
use async_trait::async_trait;

use crate::embeddings::EmbeddingProvider;

/// `[count('a'), count('b'), len]`.
pub struct FakeEmbedder;

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    fn name(&self) -> &str {
        "fake"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let a = text.chars().filter(|c| *c == 'a').count() as f32;
        let b = text.chars().filter(|c| *c == 'b').count() as f32;
        Ok(vec![a, b, text.chars().count() as f32])
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!("embedding backend unavailable")
    }
}
