//! Append-only log of parameter suggestions (JSON lines).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use docent_core::SuggestionRecord;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::warn;

/// Durable storage for suggestion records.
#[async_trait]
pub trait SuggestionLog: Send + Sync {
    async fn append(&self, record: &SuggestionRecord) -> Result<()>;

    /// Every well-formed record, oldest first.
    async fn replay(&self) -> Result<Vec<SuggestionRecord>>;
}

/// One JSON object per line. Blank lines and `#` comments are ignored on replay.
pub struct JsonlSuggestionLog {
    path: PathBuf,
}

impl JsonlSuggestionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SuggestionLog for JsonlSuggestionLog {
    async fn append(&self, record: &SuggestionRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open suggestion log: {}", self.path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn replay(&self) -> Result<Vec<SuggestionRecord>> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read suggestion log: {}", self.path.display()))?;
        Ok(parse_lines(&raw))
    }
}

fn parse_lines(raw: &str) -> Vec<SuggestionRecord> {
    let mut records = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<SuggestionRecord>(line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = idx + 1, error = %e, "Skipping malformed suggestion"),
        }
    }
    records
}

/// In-process log, for tests and ephemeral deployments.
#[derive(Default)]
pub struct MemorySuggestionLog {
    records: Mutex<Vec<SuggestionRecord>>,
}

impl MemorySuggestionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<SuggestionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub async fn records(&self) -> Vec<SuggestionRecord> {
        self.records.lock().await.clone()
    }
}

#[async_trait]
impl SuggestionLog for MemorySuggestionLog {
    async fn append(&self, record: &SuggestionRecord) -> Result<()> {
        self.records.lock().await.push(record.clone());
        Ok(())
    }

    async fn replay(&self) -> Result<Vec<SuggestionRecord>> {
        Ok(self.records.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docent_core::SuggestionStatus;

    #[test]
    fn test_parse_skips_comments_blank_and_malformed() {
        let raw = "# header\n\
                   {\"parameter\":\"intent\",\"value\":\"a\",\"status\":\"tentative\"}\n\
                   \n\
                   not json\n\
                   {\"parameter\":\"intent\",\"value\":\"a\",\"status\":\"maybe\"}\n\
                   {\"parameter\":\"intent\",\"value\":\"a\",\"status\":\"trusted\"}\n";
        let records = parse_lines(raw);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, SuggestionStatus::Tentative);
        assert_eq!(records[1].status, SuggestionStatus::Trusted);
    }

    #[tokio::test]
    async fn test_append_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlSuggestionLog::new(dir.path().join("nested/analyzer_output.txt"));
        assert!(log.replay().await.unwrap().is_empty());

        let record = SuggestionRecord {
            parameter: "intent".into(),
            value: "find_fee_policy".into(),
            status: SuggestionStatus::Tentative,
        };
        log.append(&record).await.unwrap();
        log.append(&record).await.unwrap();

        let raw = std::fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert_eq!(log.replay().await.unwrap(), vec![record.clone(), record]);
    }
}
