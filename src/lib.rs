//! Cohort Pulse - Behavioral risk assessment for course commit activity
//!
//! Pulse turns a course dataset of per-student and per-team commit logs into a
//! report of behavioral risk flags through a deterministic pipeline: dataset
//! adaptation → metric extraction → flag detection → severity and
//! recommendations → course aggregation.
//!
//! ## Modules
//!
//! - **Individual analysis**: activity rhythm, commit quality, timing, and weekly progress
//! - **Team analysis**: contribution shares and same-day collaboration
//! - **Course aggregation**: summary statistics and the ranked intervention list

pub mod adapter;
pub mod config;
pub mod course;
pub mod error;
pub mod features;
pub mod flags;
pub mod individual;
pub mod pipeline;
pub mod severity;
pub mod team;
pub mod types;

#[cfg(test)]
mod testutil;

pub use adapter::parse_dataset;
pub use config::Thresholds;
pub use course::analyze_course;
pub use error::MonitorError;
pub use individual::analyze_individual;
pub use pipeline::{course_report_from_json, CourseMonitor};
pub use team::analyze_team;

/// Pulse version reported by the CLI
pub const PULSE_VERSION: &str = env!("CARGO_PKG_VERSION");
