//! Flag detection
//!
//! Applies thresholds to extractor outputs. Rules are evaluated in a fixed order,
//! so index 0 of the returned list is always the first-detected concern.

use crate::config::Thresholds;
use crate::types::{
    ActivityPattern, ActivityPatternKind, AnalysisMetrics, CommitQuality, Flag, FlagSeverity,
    FlagType, MetricValue, ProgressTracking, ProgressTrend, TemporalPatterns,
};

/// Run every individual rule against a full metric bundle
pub fn detect_flags(metrics: &AnalysisMetrics, thresholds: &Thresholds) -> Vec<Flag> {
    detect(
        &metrics.activity_pattern,
        &metrics.commit_quality,
        &metrics.temporal_analysis,
        &metrics.progress_tracking,
        thresholds,
    )
}

/// Evaluate the seven individual rules in order
///
/// Ratios are compared at full precision. A metric that rounds to the
/// threshold at two decimals (176/250 = 0.704 against 0.7) still fires.
pub fn detect(
    activity: &ActivityPattern,
    quality: &CommitQuality,
    temporal: &TemporalPatterns,
    progress: &ProgressTracking,
    thresholds: &Thresholds,
) -> Vec<Flag> {
    let mut flags = Vec::new();

    if activity.longest_gap_days as f64 > thresholds.inactivity_days {
        flags.push(Flag {
            flag_type: FlagType::Inactivity,
            severity: FlagSeverity::High,
            description: format!(
                "Longest gap between commits: {} days",
                activity.longest_gap_days
            ),
            metric_value: MetricValue::Number(activity.longest_gap_days as f64),
        });
    }

    if progress.active_weeks_ratio < thresholds.low_progress_threshold {
        flags.push(Flag {
            flag_type: FlagType::LowProgress,
            severity: FlagSeverity::High,
            description: format!(
                "Active in only {} weeks ({:.0}%)",
                progress.active_weeks,
                progress.active_weeks_ratio * 100.0
            ),
            metric_value: MetricValue::Number(progress.active_weeks_ratio),
        });
    }

    if temporal.procrastination_indicator > thresholds.procrastination_threshold {
        flags.push(Flag {
            flag_type: FlagType::Procrastination,
            severity: FlagSeverity::Medium,
            description: format!(
                "{:.0}% of commits in final third of course",
                temporal.procrastination_indicator * 100.0
            ),
            metric_value: MetricValue::Number(temporal.procrastination_indicator),
        });
    }

    if progress.trend == ProgressTrend::Declining {
        flags.push(Flag {
            flag_type: FlagType::DecliningActivity,
            severity: FlagSeverity::Medium,
            description: "Commit activity has declined significantly over time".to_string(),
            metric_value: MetricValue::Label(progress.trend.as_str().to_string()),
        });
    }

    if quality.small_commit_ratio > thresholds.small_commit_ratio {
        flags.push(Flag {
            flag_type: FlagType::MinimalProgress,
            severity: FlagSeverity::Low,
            description: format!(
                "{:.0}% of commits are very small",
                quality.small_commit_ratio * 100.0
            ),
            metric_value: MetricValue::Number(quality.small_commit_ratio),
        });
    }

    if temporal.late_night_work_ratio > thresholds.late_night_ratio {
        flags.push(Flag {
            flag_type: FlagType::BurnoutRisk,
            severity: FlagSeverity::Low,
            description: format!(
                "{:.0}% of commits between 11pm-6am",
                temporal.late_night_work_ratio * 100.0
            ),
            metric_value: MetricValue::Number(temporal.late_night_work_ratio),
        });
    }

    if activity.pattern == ActivityPatternKind::Irregular {
        flags.push(Flag {
            flag_type: FlagType::IrregularPattern,
            severity: FlagSeverity::Medium,
            description: "Highly irregular commit pattern detected".to_string(),
            metric_value: MetricValue::Number(activity.consistency_score),
        });
    }

    flags
}

/// The single alert raised for an actor with no commits, independent of thresholds
pub fn inactive_flag() -> Flag {
    Flag {
        flag_type: FlagType::Inactive,
        severity: FlagSeverity::High,
        description: "No commits detected".to_string(),
        metric_value: MetricValue::Number(0.0),
    }
}

/// Share above which one member dominates a team
pub const IMBALANCE_MAX_PERCENT: f64 = 60.0;

/// Share below which a member is a low contributor
pub const LOW_CONTRIBUTOR_PERCENT: f64 = 10.0;

/// Team imbalance rules over member commit percentages; both may fire
pub fn detect_team_flags(percentages: &[f64]) -> Vec<Flag> {
    let mut flags = Vec::new();
    if percentages.is_empty() {
        return flags;
    }

    let max = percentages.iter().copied().fold(f64::MIN, f64::max);
    let min = percentages.iter().copied().fold(f64::MAX, f64::min);

    if max > IMBALANCE_MAX_PERCENT {
        flags.push(Flag {
            flag_type: FlagType::ContributionImbalance,
            severity: FlagSeverity::High,
            description: format!("One member contributing {max:.0}% of commits"),
            metric_value: MetricValue::Number(max),
        });
    }

    if min < LOW_CONTRIBUTOR_PERCENT {
        flags.push(Flag {
            flag_type: FlagType::LowContributor,
            severity: FlagSeverity::Medium,
            description: format!("At least one member contributing only {min:.0}% of commits"),
            metric_value: MetricValue::Number(min),
        });
    }

    flags
}
