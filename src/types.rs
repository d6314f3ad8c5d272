//! Core data types for Cohort Pulse
//!
//! This module defines the validated commit model, the per-actor metric bundles,
//! and the result types that flow out of the analysis pipeline.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Line and file counts attached to a commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitChanges {
    pub additions: u64,
    pub deletions: u64,
    pub files_changed: u64,
    /// Always `additions + deletions`
    pub total_changes: u64,
}

impl CommitChanges {
    /// Build a change record, deriving `total_changes`
    ///
    /// Returns `None` when `additions + deletions` does not fit in a `u64`.
    pub fn new(additions: u64, deletions: u64, files_changed: u64) -> Option<Self> {
        Some(Self {
            additions,
            deletions,
            files_changed,
            total_changes: additions.checked_add(deletions)?,
        })
    }
}

/// A single commit event from the activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Commit {
    /// Opaque commit identifier
    #[serde(rename = "commit_id")]
    pub id: String,
    pub repository: String,
    /// Actor identifier of the author
    pub author: String,
    /// Commit time with the author's recorded UTC offset
    ///
    /// Ordering and gaps use the absolute instant; hour-of-day and calendar-day
    /// bucketing use the local wall clock.
    pub timestamp: DateTime<FixedOffset>,
    pub message: String,
    pub changes: CommitChanges,
    pub branch: String,
}

/// Course timeline shared by every analysis in a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseInfo {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    /// Whole weeks between start and end
    pub duration_weeks: i64,
}

impl CourseInfo {
    /// Create course info, rejecting an empty or inverted timeline
    pub fn new(
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<Self, crate::MonitorError> {
        if end_date <= start_date {
            return Err(crate::MonitorError::InvalidCourse(
                "end_date must be after start_date".to_string(),
            ));
        }
        let duration_weeks = (end_date - start_date).num_days() / 7;
        Ok(Self {
            start_date,
            end_date,
            duration_weeks,
        })
    }

    /// Whole days in the course
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Number of week buckets used for progress tracking
    pub fn course_weeks(&self) -> i64 {
        self.duration_days() / 7
    }
}

/// An individual actor's project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndividualProject {
    pub student_id: String,
    pub repository: String,
    pub commits: Vec<Commit>,
    /// Label attached by synthetic data producers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
}

/// A team project; commit authors are expected to be declared members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamProject {
    pub team_id: String,
    pub repository: String,
    pub members: Vec<String>,
    pub commits: Vec<Commit>,
}

/// An actor whose records were rejected during adaptation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorFailure {
    /// Student or team identifier (or a positional placeholder when absent)
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    pub error: String,
}

/// Either a successfully processed actor or its failure marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActorOutcome<T> {
    Analyzed(T),
    Failed(ActorFailure),
}

impl<T> ActorOutcome<T> {
    pub fn analyzed(&self) -> Option<&T> {
        match self {
            ActorOutcome::Analyzed(value) => Some(value),
            ActorOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ActorOutcome::Failed(_))
    }
}

/// A normalized dataset ready for analysis
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDataset {
    pub course_info: CourseInfo,
    pub individual_projects: Vec<ActorOutcome<IndividualProject>>,
    pub team_projects: Vec<ActorOutcome<TeamProject>>,
}

// ---------------------------------------------------------------------------
// Flags and severity
// ---------------------------------------------------------------------------

/// Named concern raised by the detectors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    /// Actor has no commits at all
    Inactive,
    Inactivity,
    LowProgress,
    Procrastination,
    DecliningActivity,
    MinimalProgress,
    BurnoutRisk,
    IrregularPattern,
    ContributionImbalance,
    LowContributor,
}

impl FlagType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagType::Inactive => "inactive",
            FlagType::Inactivity => "inactivity",
            FlagType::LowProgress => "low_progress",
            FlagType::Procrastination => "procrastination",
            FlagType::DecliningActivity => "declining_activity",
            FlagType::MinimalProgress => "minimal_progress",
            FlagType::BurnoutRisk => "burnout_risk",
            FlagType::IrregularPattern => "irregular_pattern",
            FlagType::ContributionImbalance => "contribution_imbalance",
            FlagType::LowContributor => "low_contributor",
        }
    }
}

/// Severity of a single flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Low,
    Medium,
    High,
}

impl FlagSeverity {
    /// Weight used when aggregating flags into an actor severity
    pub fn weight(&self) -> u32 {
        match self {
            FlagSeverity::Low => 1,
            FlagSeverity::Medium => 2,
            FlagSeverity::High => 3,
        }
    }
}

/// Aggregate severity of an actor
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Ordering rank (none=0 .. high=3)
    pub fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::None => "none",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl From<FlagSeverity> for Severity {
    fn from(value: FlagSeverity) -> Self {
        match value {
            FlagSeverity::Low => Severity::Low,
            FlagSeverity::Medium => Severity::Medium,
            FlagSeverity::High => Severity::High,
        }
    }
}

/// The value that triggered a flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Label(String),
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        MetricValue::Number(value)
    }
}

/// A named concern with severity and triggering value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub severity: FlagSeverity,
    pub description: String,
    pub metric_value: MetricValue,
}

// ---------------------------------------------------------------------------
// Extractor outputs
// ---------------------------------------------------------------------------

/// Categorical commit rhythm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityPatternKind {
    Consistent,
    Moderate,
    Sporadic,
    Irregular,
}

/// Gap-based activity metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPattern {
    pub pattern: ActivityPatternKind,
    /// 1 / (1 + variance / scale), or 0.5 with fewer than two gaps
    pub consistency_score: f64,
    pub average_days_between_commits: f64,
    pub longest_gap_days: i64,
    pub total_commits: usize,
}

/// Commit size and message metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitQuality {
    pub average_commit_size: f64,
    pub small_commits: usize,
    pub medium_commits: usize,
    pub large_commits: usize,
    pub small_commit_ratio: f64,
    pub quality_score: f64,
    pub message_quality_ratio: f64,
}

/// Commit counts by time-of-day bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDistribution {
    /// 23:00 to 06:00
    pub late_night: usize,
    /// 06:00 to 12:00
    pub morning: usize,
    /// 12:00 to 18:00
    pub afternoon: usize,
    /// 18:00 to 23:00
    pub evening: usize,
}

/// Time-of-day and deadline-pressure metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalPatterns {
    pub late_night_work_ratio: f64,
    pub time_distribution: TimeDistribution,
    /// Fraction of commits in the final third of the course
    pub procrastination_indicator: f64,
    pub final_third_commits: usize,
}

/// Direction of weekly activity between course halves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressTrend {
    Increasing,
    Stable,
    Declining,
    InsufficientData,
}

impl ProgressTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgressTrend::Increasing => "increasing",
            ProgressTrend::Stable => "stable",
            ProgressTrend::Declining => "declining",
            ProgressTrend::InsufficientData => "insufficient_data",
        }
    }
}

/// Aggregate activity within one course week
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyActivity {
    pub commits: usize,
    pub changes: u64,
}

/// Week-bucketed progress metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressTracking {
    pub active_weeks: usize,
    pub active_weeks_ratio: f64,
    /// Week index (0-based from course start) to activity
    pub weekly_breakdown: BTreeMap<i64, WeeklyActivity>,
    pub trend: ProgressTrend,
    pub average_commits_per_week: f64,
}

/// All extractor outputs for one actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub activity_pattern: ActivityPattern,
    pub commit_quality: CommitQuality,
    pub temporal_analysis: TemporalPatterns,
    pub progress_tracking: ProgressTracking,
    /// Configured `min_commits_per_week`, echoed for comparison with the observed rate
    pub weekly_commit_target: f64,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Analysis of one individual actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub student_id: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_type: Option<String>,
    pub analysis_date: DateTime<Utc>,
    pub total_commits: usize,
    pub flags: Vec<Flag>,
    pub severity: Severity,
    pub recommendations: Vec<String>,
    /// Absent for actors with no commits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<AnalysisMetrics>,
}

/// One member's share of a team's work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberContribution {
    pub member: String,
    pub commit_count: usize,
    pub commit_percentage: f64,
    pub total_changes: u64,
    pub average_commit_size: f64,
}

/// Same-day activity overlap between team members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollaborationMetrics {
    pub collaborative_days: usize,
    pub total_active_days: usize,
    pub collaboration_ratio: f64,
}

/// Analysis of one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAnalysisResult {
    pub team_id: String,
    pub repository: String,
    pub members: Vec<String>,
    pub analysis_date: DateTime<Utc>,
    pub total_commits: usize,
    /// Declared member order
    pub member_contributions: Vec<MemberContribution>,
    pub collaboration_metrics: CollaborationMetrics,
    pub flags: Vec<Flag>,
    pub severity: Severity,
    pub recommendations: Vec<String>,
}

/// Count of individual results per severity bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub none: usize,
}

/// How often a flag type was raised across individuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagFrequency {
    pub flag_type: FlagType,
    pub count: usize,
}

/// Course-level summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseSummary {
    pub total_students: usize,
    pub total_teams: usize,
    /// Individuals at high or medium severity
    pub students_needing_attention: usize,
    /// Individuals and teams rejected as malformed
    pub failed_analyses: usize,
    pub severity_breakdown: SeverityBreakdown,
    /// Top five flag types by count
    pub most_common_flags: Vec<FlagFrequency>,
}

/// A ranked entry in the intervention list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityIntervention {
    /// 1-based
    pub rank: usize,
    pub student_id: String,
    pub repository: String,
    pub severity: Severity,
    pub flag_count: usize,
    pub primary_concern: Option<FlagType>,
    pub recommendations: Vec<String>,
}

/// Full course-level report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseReport {
    pub report_id: String,
    pub course_info: CourseInfo,
    pub analysis_date: DateTime<Utc>,
    pub summary: CourseSummary,
    pub individual_analyses: Vec<ActorOutcome<AnalysisResult>>,
    pub team_analyses: Vec<ActorOutcome<TeamAnalysisResult>>,
    pub priority_interventions: Vec<PriorityIntervention>,
}
