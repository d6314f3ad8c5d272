//! Error types for Cohort Pulse

use thiserror::Error;

/// Errors that can occur while adapting or analysing a course dataset
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record for {actor}: {reason}")]
    MalformedRecord { actor: String, reason: String },

    #[error("Invalid course info: {0}")]
    InvalidCourse(String),

    #[error("Unknown threshold: {0}")]
    UnknownThreshold(String),

    #[error("Invalid value {value} for threshold {name}")]
    InvalidThreshold { name: String, value: f64 },

    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl MonitorError {
    /// Shorthand for a per-actor rejection
    pub fn malformed(actor: impl Into<String>, reason: impl Into<String>) -> Self {
        MonitorError::MalformedRecord {
            actor: actor.into(),
            reason: reason.into(),
        }
    }
}
