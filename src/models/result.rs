//! Result and statistics types.
//!
//! Persisted shapes keep the camelCase field names of the data files
//! they originated from, so existing logs stay readable.

use serde::{Deserialize, Serialize};

/// One persisted per-question outcome. `uid` is unique within the log;
/// saving a record with an existing uid replaces the prior one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub uid: String,
    pub text: String,
    pub explanation: String,
    pub options: Vec<String>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub is_correct: bool,
    pub source: String,
}

/// Monotone counters across all sessions. Reset only by full reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_answered: u32,
    pub total_correct: u32,
    pub quizzes_taken: u32,
}

/// Counters for one quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub correct: u32,
    pub wrong: u32,
    pub total: u32,
}

/// Aggregate produced when a session finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub subject: String,
    pub correct: u32,
    pub wrong: u32,
    pub skipped: u32,
    pub total_questions: u32,
    /// Rounded percentage; 0 when nothing was answered.
    pub accuracy: u32,
}
