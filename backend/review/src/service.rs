//! Entry point for conversation reviews.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use docent_core::ChatMessage;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::analyzer::{ConversationAnalyzer, Pathway};
use crate::history::{ReviewEntry, ReviewHistory};
use crate::worker::{spawn_worker, ReviewQueue};

/// Default capacity of the background review queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// A rated conversation submitted for review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRequest {
    pub rating: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewMode {
    #[default]
    Background,
    Inline,
}

impl FromStr for ReviewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" => Ok(ReviewMode::Background),
            "inline" => Ok(ReviewMode::Inline),
            other => Err(format!("unknown review mode '{}'", other)),
        }
    }
}

impl fmt::Display for ReviewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewMode::Background => write!(f, "background"),
            ReviewMode::Inline => write!(f, "inline"),
        }
    }
}

/// Analysis followed by a history append.
pub struct ReviewProcessor {
    analyzer: ConversationAnalyzer,
    history: ReviewHistory,
}

impl ReviewProcessor {
    pub fn new(analyzer: ConversationAnalyzer, history: ReviewHistory) -> Self {
        Self { analyzer, history }
    }

    pub fn analyzer(&self) -> &ConversationAnalyzer {
        &self.analyzer
    }

    /// Never fails; a history write error is logged and the pathways are
    /// still returned.
    pub async fn process(&self, request: ReviewRequest) -> Vec<Pathway> {
        let pathways = self.analyzer.analyze(&request.messages).await;

        let entry = ReviewEntry {
            timestamp: Utc::now(),
            rating: request.rating,
            feedback: request.feedback.filter(|f| !f.is_empty()),
            messages: request.messages,
            pathways,
        };
        if let Err(e) = self.history.append(&entry).await {
            warn!(path = %self.history.path().display(), error = %e, "Failed to write review history");
        }
        entry.pathways
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewOutcome {
    /// Review is disabled by configuration.
    Skipped,
    /// Handed to the background worker (or dropped if the queue was full).
    Submitted,
    /// Processed inline.
    Completed(Vec<Pathway>),
}

pub struct ReviewService {
    enabled: bool,
    mode: ReviewMode,
    processor: Arc<ReviewProcessor>,
    queue: Option<ReviewQueue>,
}

impl ReviewService {
    /// Background mode spawns the worker, so this must run inside a Tokio runtime.
    pub fn new(processor: ReviewProcessor, enabled: bool, mode: ReviewMode, queue_capacity: usize) -> Self {
        let processor = Arc::new(processor);
        let queue = if enabled && mode == ReviewMode::Background {
            let (queue, _handle) = spawn_worker(processor.clone(), queue_capacity);
            Some(queue)
        } else {
            None
        };
        info!(enabled, mode = %mode, "Review service ready");
        Self {
            enabled,
            mode,
            processor,
            queue,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn mode(&self) -> ReviewMode {
        self.mode
    }

    pub async fn submit(&self, request: ReviewRequest) -> ReviewOutcome {
        if !self.enabled {
            return ReviewOutcome::Skipped;
        }
        match &self.queue {
            Some(queue) => {
                queue.try_submit(request);
                ReviewOutcome::Submitted
            }
            None => ReviewOutcome::Completed(self.processor.process(request).await),
        }
    }
}
