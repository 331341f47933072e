//! Persistent embeddings store.
//!
//! The whole corpus lives in one JSON array file (`embeddings.json`). It is
//! either read back as-is or regenerated wholesale from the source directory;
//! there are no incremental updates.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use docent_core::{Chunk, EmbeddingRecord};
use docent_understanding::DocumentIngestor;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::embeddings::EmbeddingProvider;

/// Chunks sent to the embedding backend per request.
const EMBED_BATCH_SIZE: usize = 32;

pub struct EmbeddingStore {
    path: PathBuf,
    records: RwLock<Arc<Vec<EmbeddingRecord>>>,
}

impl EmbeddingStore {
    /// Empty store backed by `path`. Nothing is read until [`load`](Self::load).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: RwLock::new(Arc::new(Vec::new())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current record set. Cheap; callers keep the `Arc` for the whole query.
    pub async fn snapshot(&self) -> Arc<Vec<EmbeddingRecord>> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Swap in a fully built record set.
    pub async fn replace(&self, records: Vec<EmbeddingRecord>) {
        *self.records.write().await = Arc::new(records);
    }

    /// Read the persisted store, or rebuild it when there is none.
    pub async fn load(
        &self,
        ingestor: &DocumentIngestor,
        source_dir: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        if let Some(records) = read_records(&self.path).await? {
            let count = records.len();
            self.replace(records).await;
            info!(path = %self.path.display(), records = count, "Loaded embeddings store");
            return Ok(count);
        }
        self.rebuild(ingestor, source_dir, embedder).await
    }

    /// Re-ingest `source_dir`, embed every chunk and persist the result,
    /// discarding whatever was stored before.
    ///
    /// Any ingest or embedding failure aborts before anything is written.
    pub async fn rebuild(
        &self,
        ingestor: &DocumentIngestor,
        source_dir: &Path,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<usize> {
        info!(source = %source_dir.display(), embedder = embedder.name(), "Rebuilding embeddings store");
        let chunks = ingestor.ingest_dir(source_dir).await?;
        let records = embed_chunks(chunks, embedder).await?;
        write_records(&self.path, &records).await?;

        let count = records.len();
        self.replace(records).await;
        info!(path = %self.path.display(), records = count, "Rebuilt embeddings store");
        Ok(count)
    }
}

/// Embed chunks in order. The first backend failure aborts the whole set.
pub async fn embed_chunks(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Vec<EmbeddingRecord>> {
    let mut records = Vec::with_capacity(chunks.len());
    for batch in chunks.chunks(EMBED_BATCH_SIZE) {
        let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
        let vectors = embedder
            .embed_batch(&texts)
            .await
            .with_context(|| format!("Embedding failed for chunk from {}", batch[0].source))?;
        if vectors.len() != batch.len() {
            anyhow::bail!(
                "{} returned {} embeddings for {} chunks",
                embedder.name(),
                vectors.len(),
                batch.len()
            );
        }
        records.extend(
            batch
                .iter()
                .cloned()
                .zip(vectors)
                .map(|(chunk, embedding)| EmbeddingRecord::from_chunk(chunk, embedding)),
        );
    }
    Ok(records)
}

/// Read a store file. `None` means "rebuild": the file is missing or is not a
/// JSON array. Individual malformed records are skipped.
pub async fn read_records(path: &Path) -> Result<Option<Vec<EmbeddingRecord>>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read embeddings store: {}", path.display()))?;

    let items = match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Array(items)) => items,
        Ok(_) => {
            warn!(path = %path.display(), "Embeddings store is not a JSON array, rebuilding");
            return Ok(None);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Embeddings store is unreadable, rebuilding");
            return Ok(None);
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<EmbeddingRecord>(item) {
            Ok(record) => records.push(record),
            Err(e) => warn!(index = idx, error = %e, "Skipping malformed embedding record"),
        }
    }
    Ok(Some(records))
}

/// Write the full record set atomically (temp file, then rename).
pub async fn write_records(path: &Path, records: &[EmbeddingRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
    }
    let json = serde_json::to_string(records)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json.as_bytes())
        .await
        .with_context(|| format!("Failed to write temp store: {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to rename temp store to: {}", path.display()))?;
    Ok(())
}
