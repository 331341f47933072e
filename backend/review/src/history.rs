//! Review history: one JSON line per reviewed conversation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use docent_core::ChatMessage;
use serde::{Deserialize, Serialize};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::analyzer::Pathway;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewEntry {
    pub timestamp: DateTime<Utc>,
    pub rating: String,
    pub feedback: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub pathways: Vec<Pathway>,
}

pub struct ReviewHistory {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ReviewHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, entry: &ReviewEntry) -> Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let _guard = self.lock.lock().await;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open review history: {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_creates_parent_and_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let history = ReviewHistory::new(dir.path().join("reviews/history.jsonl"));

        let entry = ReviewEntry {
            timestamp: Utc::now(),
            rating: "good".into(),
            feedback: None,
            messages: vec![ChatMessage::user("hi")],
            pathways: vec![Pathway::Error { error: "x".into() }],
        };
        history.append(&entry).await.unwrap();
        history.append(&entry).await.unwrap();

        let raw = std::fs::read_to_string(history.path()).unwrap();
        let lines: Vec<&str> = raw.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["rating"], "good");
        assert!(parsed["feedback"].is_null());
        assert_eq!(parsed["messages"][0]["role"], "user");
        assert_eq!(parsed["pathways"][0]["error"], "x");
    }
}
