//! Execution records and result envelopes
//!
//! An [`ExecutionRecord`] is what the ledger stores for every attempt to run
//! a bot command; an [`ExecutionEnvelope`] is what the caller of `execute()`
//! gets back. Both carry either a result or an error, never both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one bot command.
///
/// Flattened into records so the JSON form carries exactly one of
/// `result` / `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionOutcome {
    Success { result: Value },
    Failure { error: String },
}

impl ExecutionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Success { .. })
    }

    pub fn result(&self) -> Option<&Value> {
        match self {
            ExecutionOutcome::Success { result } => Some(result),
            ExecutionOutcome::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Success { .. } => None,
            ExecutionOutcome::Failure { error } => Some(error),
        }
    }
}

/// Ledger entry for a single execution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Bot name as requested by the caller (may be unregistered)
    pub bot: String,
    pub command: String,
    /// Caller params, passed through verbatim
    pub params: Value,
    #[serde(flatten)]
    pub outcome: ExecutionOutcome,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    pub success: bool,
    pub timestamp: DateTime<Utc>,
}

impl ExecutionRecord {
    /// Record a successful execution
    pub fn succeeded(
        bot: impl Into<String>,
        command: impl Into<String>,
        params: Value,
        result: Value,
        duration_ms: u64,
    ) -> Self {
        Self::with_outcome(
            bot,
            command,
            params,
            ExecutionOutcome::Success { result },
            duration_ms,
        )
    }

    /// Record a failed execution
    pub fn failed(
        bot: impl Into<String>,
        command: impl Into<String>,
        params: Value,
        error: impl Into<String>,
        duration_ms: u64,
    ) -> Self {
        Self::with_outcome(
            bot,
            command,
            params,
            ExecutionOutcome::Failure {
                error: error.into(),
            },
            duration_ms,
        )
    }

    fn with_outcome(
        bot: impl Into<String>,
        command: impl Into<String>,
        params: Value,
        outcome: ExecutionOutcome,
        duration_ms: u64,
    ) -> Self {
        Self {
            bot: bot.into(),
            command: command.into(),
            params,
            success: outcome.is_success(),
            outcome,
            duration_ms,
            timestamp: Utc::now(),
        }
    }

    /// Override the creation timestamp (used when rehydrating from storage)
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn result(&self) -> Option<&Value> {
        self.outcome.result()
    }

    pub fn error(&self) -> Option<&str> {
        self.outcome.error()
    }
}

/// Normalized response of every `execute()` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Duration in milliseconds
    pub duration: u64,
    pub bot: String,
    pub command: String,
}

impl From<&ExecutionRecord> for ExecutionEnvelope {
    fn from(record: &ExecutionRecord) -> Self {
        Self {
            success: record.success,
            result: record.result().cloned(),
            error: record.error().map(str::to_string),
            duration: record.duration_ms,
            bot: record.bot.clone(),
            command: record.command.clone(),
        }
    }
}
