//! Vote-threshold promotion of inferred parameters.
//!
//! Each suggested `(parameter, value)` pair collects votes. When a value
//! reaches the threshold it becomes the parameter's trusted value; after that,
//! matching suggestions are no-ops and differing ones are reported as
//! conflicts until a caller resolves them explicitly.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use docent_core::{SuggestionRecord, SuggestionStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::suggestion_log::SuggestionLog;

pub const DEFAULT_TRUST_THRESHOLD: u32 = 3;

/// What a caller should do about a conflicting suggestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConflictAction {
    AskUserToChoose,
}

/// Result of a single suggestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SuggestionOutcome {
    /// Recorded as a tentative vote.
    Pending { votes: u32, needed: u32 },
    /// This vote reached the threshold.
    Promoted { parameter: String, value: String },
    /// Matches the trusted value already in place.
    Unchanged { trusted: bool, parameter: String, value: String },
    /// Differs from the trusted value. Nothing was changed.
    Conflict {
        trusted_value: String,
        new_value: String,
        action: ConflictAction,
    },
}

#[derive(Debug, Default)]
struct TrustState {
    votes: HashMap<String, HashMap<String, u32>>,
    trusted: HashMap<String, String>,
}

impl TrustState {
    fn vote_count(&self, parameter: &str, value: &str) -> u32 {
        self.votes
            .get(parameter)
            .and_then(|v| v.get(value))
            .copied()
            .unwrap_or(0)
    }

    fn add_vote(&mut self, parameter: &str, value: &str) -> u32 {
        let count = self
            .votes
            .entry(parameter.to_string())
            .or_default()
            .entry(value.to_string())
            .or_insert(0);
        *count += 1;
        *count
    }

    fn apply(&mut self, record: &SuggestionRecord) {
        match record.status {
            SuggestionStatus::Tentative => {
                if !self.trusted.contains_key(&record.parameter) {
                    self.add_vote(&record.parameter, &record.value);
                }
            }
            SuggestionStatus::Trusted => {
                self.add_vote(&record.parameter, &record.value);
                self.trusted
                    .insert(record.parameter.clone(), record.value.clone());
            }
        }
    }
}

/// Owns vote counts and trusted values. One mutex covers the whole
/// read-increment-compare-append sequence.
pub struct ParameterTrustEngine {
    state: Mutex<TrustState>,
    log: Arc<dyn SuggestionLog>,
    threshold: u32,
}

impl ParameterTrustEngine {
    /// Rebuild state by replaying `log`.
    pub async fn open(log: Arc<dyn SuggestionLog>, threshold: u32) -> Result<Self> {
        let threshold = if threshold == 0 {
            warn!("Trust threshold 0 is invalid, using 1");
            1
        } else {
            threshold
        };

        let mut state = TrustState::default();
        let records = log.replay().await?;
        for record in &records {
            state.apply(record);
        }
        info!(
            records = records.len(),
            trusted = state.trusted.len(),
            threshold,
            "Replayed suggestion log"
        );

        Ok(Self {
            state: Mutex::new(state),
            log,
            threshold,
        })
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Register one vote for `value`.
    ///
    /// State only changes once the log append has succeeded.
    pub async fn suggest(&self, parameter: &str, value: &str) -> Result<SuggestionOutcome> {
        let mut state = self.state.lock().await;

        if let Some(trusted) = state.trusted.get(parameter) {
            if trusted == value {
                return Ok(SuggestionOutcome::Unchanged {
                    trusted: true,
                    parameter: parameter.to_string(),
                    value: value.to_string(),
                });
            }
            debug!(parameter, trusted = %trusted, suggested = value, "Suggestion conflicts with trusted value");
            return Ok(SuggestionOutcome::Conflict {
                trusted_value: trusted.clone(),
                new_value: value.to_string(),
                action: ConflictAction::AskUserToChoose,
            });
        }

        let votes = state.vote_count(parameter, value) + 1;
        let promoted = votes >= self.threshold;
        let record = SuggestionRecord {
            parameter: parameter.to_string(),
            value: value.to_string(),
            status: if promoted {
                SuggestionStatus::Trusted
            } else {
                SuggestionStatus::Tentative
            },
        };
        self.log.append(&record).await?;
        state.add_vote(parameter, value);

        if promoted {
            state
                .trusted
                .insert(parameter.to_string(), value.to_string());
            info!(parameter, value, votes, "Parameter promoted to trusted");
            Ok(SuggestionOutcome::Promoted {
                parameter: parameter.to_string(),
                value: value.to_string(),
            })
        } else {
            debug!(parameter, value, votes, needed = self.threshold, "Suggestion pending");
            Ok(SuggestionOutcome::Pending {
                votes,
                needed: self.threshold,
            })
        }
    }

    /// Make `value` the trusted value for `parameter`, replacing any other.
    pub async fn resolve(&self, parameter: &str, value: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let record = SuggestionRecord {
            parameter: parameter.to_string(),
            value: value.to_string(),
            status: SuggestionStatus::Trusted,
        };
        self.log.append(&record).await?;
        state.apply(&record);
        info!(parameter, value, "Parameter resolved");
        Ok(())
    }

    pub async fn trusted_value(&self, parameter: &str) -> Option<String> {
        self.state.lock().await.trusted.get(parameter).cloned()
    }

    /// Snapshot of every trusted parameter.
    pub async fn trusted(&self) -> BTreeMap<String, String> {
        self.state
            .lock()
            .await
            .trusted
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Vote counts per value for one parameter.
    pub async fn votes(&self, parameter: &str) -> BTreeMap<String, u32> {
        self.state
            .lock()
            .await
            .votes
            .get(parameter)
            .map(|v| v.iter().map(|(k, c)| (k.clone(), *c)).collect())
            .unwrap_or_default()
    }
}
