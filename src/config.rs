//! Detection thresholds
//!
//! Thresholds are an immutable value threaded through every detector call.
//! Unset entries fall back to the documented defaults.

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_MIN_COMMITS_PER_WEEK: f64 = 2.0;
pub const DEFAULT_INACTIVITY_DAYS: f64 = 14.0;
pub const DEFAULT_PROCRASTINATION_THRESHOLD: f64 = 0.6;
pub const DEFAULT_LOW_PROGRESS_THRESHOLD: f64 = 0.3;
pub const DEFAULT_SMALL_COMMIT_RATIO: f64 = 0.7;
pub const DEFAULT_LATE_NIGHT_RATIO: f64 = 0.5;

/// Names accepted by [`Thresholds::with_overrides`]
pub const THRESHOLD_NAMES: [&str; 6] = [
    "min_commits_per_week",
    "inactivity_days",
    "procrastination_threshold",
    "low_progress_threshold",
    "small_commit_ratio",
    "late_night_ratio",
];

/// Numeric knobs for flag detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Thresholds {
    /// Expected weekly commit rate; reported alongside the observed rate
    pub min_commits_per_week: f64,
    /// Longest tolerated gap between commits, in days
    pub inactivity_days: f64,
    /// Share of commits in the final third above which procrastination is flagged
    pub procrastination_threshold: f64,
    /// Share of active weeks below which low progress is flagged
    pub low_progress_threshold: f64,
    /// Share of small commits above which minimal progress is flagged
    pub small_commit_ratio: f64,
    /// Share of late-night commits above which burnout risk is flagged
    pub late_night_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_commits_per_week: DEFAULT_MIN_COMMITS_PER_WEEK,
            inactivity_days: DEFAULT_INACTIVITY_DAYS,
            procrastination_threshold: DEFAULT_PROCRASTINATION_THRESHOLD,
            low_progress_threshold: DEFAULT_LOW_PROGRESS_THRESHOLD,
            small_commit_ratio: DEFAULT_SMALL_COMMIT_RATIO,
            late_night_ratio: DEFAULT_LATE_NIGHT_RATIO,
        }
    }
}

impl Thresholds {
    /// Apply a name-to-value mapping on top of these thresholds
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self, MonitorError> {
        for (name, value) in overrides {
            self.set(name, *value)?;
        }
        Ok(self)
    }

    /// Set a single threshold by name
    pub fn set(&mut self, name: &str, value: f64) -> Result<(), MonitorError> {
        if !value.is_finite() || value < 0.0 {
            return Err(MonitorError::InvalidThreshold {
                name: name.to_string(),
                value,
            });
        }

        let slot = match name {
            "min_commits_per_week" => &mut self.min_commits_per_week,
            "inactivity_days" => &mut self.inactivity_days,
            "procrastination_threshold" => &mut self.procrastination_threshold,
            "low_progress_threshold" => &mut self.low_progress_threshold,
            "small_commit_ratio" => &mut self.small_commit_ratio,
            "late_night_ratio" => &mut self.late_night_ratio,
            other => return Err(MonitorError::UnknownThreshold(other.to_string())),
        };
        *slot = value;
        Ok(())
    }

    /// Load overrides from a JSON object, e.g. `{"inactivity_days": 10}`
    pub fn from_json(json: &str) -> Result<Self, MonitorError> {
        let overrides: HashMap<String, f64> = serde_json::from_str(json)?;
        Self::default().with_overrides(&overrides)
    }

    /// Parse a `name=value` assignment as passed on the command line
    pub fn apply_assignment(&mut self, assignment: &str) -> Result<(), MonitorError> {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| MonitorError::UnknownThreshold(assignment.to_string()))?;
        let name = name.trim();
        let value: f64 = raw.trim().parse().map_err(|_| MonitorError::InvalidThreshold {
            name: name.to_string(),
            value: f64::NAN,
        })?;
        self.set(name, value)
    }
}
