//! Log of every question users asked in reviewed conversations.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use docent_core::{user_turns, ChatMessage};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuestionEntry {
    pub question: String,
    pub timestamp: DateTime<Utc>,
}

/// A JSON array file, rewritten in full on every append.
pub struct QuestionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl QuestionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append the user turns of `messages`. Returns how many were written.
    pub async fn record(&self, messages: &[ChatMessage]) -> Result<usize> {
        let questions = user_turns(messages);
        if questions.is_empty() {
            return Ok(0);
        }

        let _guard = self.lock.lock().await;
        let mut entries = self.read().await?;
        let now = Utc::now();
        entries.extend(questions.iter().map(|q| QuestionEntry {
            question: q.to_string(),
            timestamp: now,
        }));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write question log: {}", tmp.display()))?;
        fs::rename(&tmp, &self.path).await?;

        debug!(added = questions.len(), total = entries.len(), "Recorded questions");
        Ok(questions.len())
    }

    /// All entries. Malformed entries are skipped; a file that is not a
    /// JSON array is an error so `record` never overwrites it.
    pub async fn read(&self) -> Result<Vec<QuestionEntry>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read question log: {}", self.path.display()))?;

        let items = match serde_json::from_str::<serde_json::Value>(&raw)
            .with_context(|| format!("Question log is not valid JSON: {}", self.path.display()))?
        {
            serde_json::Value::Array(items) => items,
            _ => anyhow::bail!("Question log is not a JSON array: {}", self.path.display()),
        };

        let mut entries = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<QuestionEntry>(item) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %self.path.display(), index = idx, error = %e, "Skipping malformed question entry"),
            }
        }
        Ok(entries)
    }
}
