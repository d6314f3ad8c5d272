//! Commit metric extraction
//!
//! Pure functions that turn one actor's commit sequence plus the course timeline
//! into activity-pattern, commit-quality, temporal, and progress metrics.
//! Every extractor is total: an empty or single-commit history yields defined
//! neutral values instead of an error.

use crate::config::Thresholds;
use crate::types::{
    ActivityPattern, ActivityPatternKind, AnalysisMetrics, Commit, CommitQuality, CourseInfo,
    ProgressTracking, ProgressTrend, TemporalPatterns, TimeDistribution, WeeklyActivity,
};
use chrono::{DateTime, Duration, FixedOffset, Timelike, Utc};
use std::collections::BTreeMap;

/// Divisor applied to gap variance in the consistency score
pub const CONSISTENCY_VARIANCE_SCALE: f64 = 100.0;

/// Consistency score used when fewer than two gaps exist
pub const NEUTRAL_CONSISTENCY: f64 = 0.5;

/// Commits below this many changed lines are small
pub const SMALL_COMMIT_LINES: u64 = 50;

/// Commits at or above this many changed lines are large
pub const LARGE_COMMIT_LINES: u64 = 150;

/// Messages must be longer than this to count as meaningful
pub const MIN_MESSAGE_CHARS: usize = 10;

/// Substrings that mark a commit message as low-information
pub const VAGUE_MESSAGE_WORDS: [&str; 3] = ["fix", "update", "change"];

const SECONDS_PER_DAY: i64 = 86_400;

/// Feature deriver for commit histories
pub struct CommitFeatureDeriver;

impl CommitFeatureDeriver {
    /// Run all four extractors over one actor's commits
    pub fn derive(commits: &[Commit], course: &CourseInfo, thresholds: &Thresholds) -> AnalysisMetrics {
        AnalysisMetrics {
            activity_pattern: analyze_activity_pattern(commits, thresholds.inactivity_days),
            commit_quality: analyze_commit_quality(commits),
            temporal_analysis: analyze_temporal_patterns(commits, course),
            progress_tracking: track_progress(commits, course),
            weekly_commit_target: thresholds.min_commits_per_week,
        }
    }
}

/// Gap statistics and rhythm label
///
/// Gaps are whole days between chronologically consecutive commits. The label is
/// chosen in precedence order: irregular, consistent, moderate, sporadic.
pub fn analyze_activity_pattern(commits: &[Commit], inactivity_days: f64) -> ActivityPattern {
    let gaps = day_gaps(commits);

    let average_gap = mean(&gaps);
    let longest_gap = gaps.iter().copied().max().unwrap_or(0);
    let consistency_score = consistency_score(&gaps);

    let pattern = if longest_gap as f64 > inactivity_days {
        ActivityPatternKind::Irregular
    } else if average_gap <= 3.0 {
        ActivityPatternKind::Consistent
    } else if average_gap <= 7.0 {
        ActivityPatternKind::Moderate
    } else {
        ActivityPatternKind::Sporadic
    };

    ActivityPattern {
        pattern,
        consistency_score,
        average_days_between_commits: average_gap,
        longest_gap_days: longest_gap,
        total_commits: commits.len(),
    }
}

/// Whole-day gaps between consecutive commits, after sorting by time
fn day_gaps(commits: &[Commit]) -> Vec<i64> {
    let mut timestamps: Vec<DateTime<FixedOffset>> = commits.iter().map(|c| c.timestamp).collect();
    timestamps.sort();
    timestamps
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).num_days())
        .collect()
}

/// Formula: `1 / (1 + population_variance(gaps) / 100)`
fn consistency_score(gaps: &[i64]) -> f64 {
    if gaps.len() < 2 {
        return NEUTRAL_CONSISTENCY;
    }
    let avg = mean(gaps);
    let variance = gaps
        .iter()
        .map(|&g| (g as f64 - avg).powi(2))
        .sum::<f64>()
        / gaps.len() as f64;
    1.0 / (1.0 + variance / CONSISTENCY_VARIANCE_SCALE)
}

fn mean(values: &[i64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<i64>() as f64 / values.len() as f64
}

fn ratio(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    part as f64 / total as f64
}

/// Size classes, heuristic quality score, and message quality
pub fn analyze_commit_quality(commits: &[Commit]) -> CommitQuality {
    let total = commits.len();

    let mut small = 0;
    let mut medium = 0;
    let mut large = 0;
    let mut total_lines: u64 = 0;
    for commit in commits {
        let size = commit.changes.total_changes;
        total_lines = total_lines.saturating_add(size);
        if size < SMALL_COMMIT_LINES {
            small += 1;
        } else if size < LARGE_COMMIT_LINES {
            medium += 1;
        } else {
            large += 1;
        }
    }

    let small_ratio = ratio(small, total);
    let large_ratio = ratio(large, total);

    // First matching rule wins
    let quality_score = if (0.3..=0.6).contains(&small_ratio) && medium > 0 {
        0.8
    } else if small_ratio > 0.8 {
        0.4
    } else if large_ratio > 0.5 {
        0.6
    } else {
        0.7
    };

    let meaningful = commits
        .iter()
        .filter(|c| is_meaningful_message(&c.message))
        .count();

    CommitQuality {
        average_commit_size: if total == 0 {
            0.0
        } else {
            total_lines as f64 / total as f64
        },
        small_commits: small,
        medium_commits: medium,
        large_commits: large,
        small_commit_ratio: small_ratio,
        quality_score,
        message_quality_ratio: ratio(meaningful, total),
    }
}

/// Long enough and free of vague verbs (case-insensitive substring match)
fn is_meaningful_message(message: &str) -> bool {
    if message.chars().count() <= MIN_MESSAGE_CHARS {
        return false;
    }
    let lower = message.to_lowercase();
    !VAGUE_MESSAGE_WORDS.iter().any(|word| lower.contains(word))
}

/// Time-of-day buckets and the final-third share of commits
pub fn analyze_temporal_patterns(commits: &[Commit], course: &CourseInfo) -> TemporalPatterns {
    let mut distribution = TimeDistribution::default();
    for commit in commits {
        let hour = commit.timestamp.hour();
        if is_late_night(hour) {
            distribution.late_night += 1;
        } else if hour < 12 {
            distribution.morning += 1;
        } else if hour < 18 {
            distribution.afternoon += 1;
        } else {
            distribution.evening += 1;
        }
    }

    let final_third_start =
        course.start_date + Duration::seconds(course.duration_days() * SECONDS_PER_DAY * 2 / 3);
    let final_third_commits = commits
        .iter()
        .filter(|c| c.timestamp.with_timezone(&Utc) >= final_third_start)
        .count();

    TemporalPatterns {
        late_night_work_ratio: ratio(distribution.late_night, commits.len()),
        time_distribution: distribution,
        procrastination_indicator: ratio(final_third_commits, commits.len()),
        final_third_commits,
    }
}

/// 23:00 up to 06:00, wrapping midnight
fn is_late_night(hour: u32) -> bool {
    (hour + 1) % 24 < 7
}

/// Week index of a timestamp relative to course start (floored, may be negative)
fn week_index(timestamp: DateTime<FixedOffset>, course: &CourseInfo) -> i64 {
    let elapsed = timestamp.with_timezone(&Utc) - course.start_date;
    // num_days truncates toward zero
    let mut days = elapsed.num_days();
    if elapsed < Duration::days(days) {
        days -= 1;
    }
    days.div_euclid(7)
}

/// Weekly bucketing and first-half versus second-half trend
pub fn track_progress(commits: &[Commit], course: &CourseInfo) -> ProgressTracking {
    let course_weeks = course.course_weeks();

    let mut weekly: BTreeMap<i64, WeeklyActivity> = BTreeMap::new();
    for commit in commits {
        let week = week_index(commit.timestamp, course);
        if (0..course_weeks).contains(&week) {
            let entry = weekly.entry(week).or_default();
            entry.commits += 1;
            entry.changes = entry.changes.saturating_add(commit.changes.total_changes);
        }
    }

    let active_weeks = weekly.len();
    let (active_weeks_ratio, average_commits_per_week) = if course_weeks > 0 {
        (
            active_weeks as f64 / course_weeks as f64,
            commits.len() as f64 / course_weeks as f64,
        )
    } else {
        (0.0, 0.0)
    };

    ProgressTracking {
        active_weeks,
        active_weeks_ratio,
        trend: progress_trend(&weekly, course_weeks),
        weekly_breakdown: weekly,
        average_commits_per_week,
    }
}

/// Compare mean commits per active week before and after the course midpoint
fn progress_trend(weekly: &BTreeMap<i64, WeeklyActivity>, course_weeks: i64) -> ProgressTrend {
    if weekly.len() < 3 {
        return ProgressTrend::InsufficientData;
    }

    let midpoint = course_weeks / 2;
    let first: Vec<usize> = weekly.range(..midpoint).map(|(_, w)| w.commits).collect();
    let second: Vec<usize> = weekly.range(midpoint..).map(|(_, w)| w.commits).collect();

    let first_avg = mean_count(&first);
    let second_avg = mean_count(&second);

    if second_avg < first_avg * 0.5 {
        ProgressTrend::Declining
    } else if second_avg > first_avg * 1.5 {
        ProgressTrend::Increasing
    } else {
        ProgressTrend::Stable
    }
}

fn mean_count(values: &[usize]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{commit, commit_with_message, course};
    use crate::types::CommitChanges;

    #[test]
    fn test_single_commit_is_neutral() {
        let commits = vec![commit("a", 10, 14, 80)];
        let activity = analyze_activity_pattern(&commits, 14.0);
        assert_eq!(activity.longest_gap_days, 0);
        assert_eq!(activity.average_days_between_commits, 0.0);
        assert_eq!(activity.consistency_score, 0.5);
        assert_eq!(activity.pattern, ActivityPatternKind::Consistent);

        let progress = track_progress(&commits, &course());
        assert_eq!(progress.trend, ProgressTrend::InsufficientData);
        assert_eq!(progress.active_weeks, 1);
    }

    #[test]
    fn test_gaps_use_sorted_order() {
        // Out of order input: days 20, 0, 5 -> gaps 5, 15
        let commits = vec![
            commit("a", 20, 10, 60),
            commit("a", 0, 10, 60),
            commit("a", 5, 10, 60),
        ];
        let activity = analyze_activity_pattern(&commits, 14.0);
        assert_eq!(activity.longest_gap_days, 15);
        assert_eq!(activity.average_days_between_commits, 10.0);
        assert_eq!(activity.pattern, ActivityPatternKind::Irregular);
    }

    #[test]
    fn test_consistency_uses_population_variance() {
        // Gaps 2 and 22: mean 12, population variance 100
        let commits = vec![
            commit("a", 0, 10, 60),
            commit("a", 2, 10, 60),
            commit("a", 24, 10, 60),
        ];
        let activity = analyze_activity_pattern(&commits, 30.0);
        assert!((activity.consistency_score - 0.5).abs() < 1e-9);
        assert_eq!(activity.pattern, ActivityPatternKind::Sporadic);
    }

    #[test]
    fn test_pattern_labels() {
        let daily: Vec<_> = (0..5).map(|d| commit("a", d * 2, 10, 60)).collect();
        assert_eq!(
            analyze_activity_pattern(&daily, 14.0).pattern,
            ActivityPatternKind::Consistent
        );

        let weekly: Vec<_> = (0..5).map(|d| commit("a", d * 6, 10, 60)).collect();
        assert_eq!(
            analyze_activity_pattern(&weekly, 14.0).pattern,
            ActivityPatternKind::Moderate
        );

        let fortnightly: Vec<_> = (0..4).map(|d| commit("a", d * 10, 10, 60)).collect();
        assert_eq!(
            analyze_activity_pattern(&fortnightly, 14.0).pattern,
            ActivityPatternKind::Sporadic
        );
    }

    #[test]
    fn test_empty_history_is_total() {
        let activity = analyze_activity_pattern(&[], 14.0);
        assert_eq!(activity.total_commits, 0);
        assert_eq!(activity.consistency_score, 0.5);

        let quality = analyze_commit_quality(&[]);
        assert_eq!(quality.small_commit_ratio, 0.0);
        assert_eq!(quality.average_commit_size, 0.0);

        let temporal = analyze_temporal_patterns(&[], &course());
        assert_eq!(temporal.late_night_work_ratio, 0.0);
        assert_eq!(temporal.procrastination_indicator, 0.0);

        let progress = track_progress(&[], &course());
        assert_eq!(progress.active_weeks_ratio, 0.0);
        assert_eq!(progress.trend, ProgressTrend::InsufficientData);
    }

    #[test]
    fn test_size_classes_partition_commits() {
        let commits = vec![
            commit("a", 0, 10, 10),
            commit("a", 1, 10, 49),
            commit("a", 2, 10, 50),
            commit("a", 3, 10, 149),
            commit("a", 4, 10, 150),
        ];
        let quality = analyze_commit_quality(&commits);
        assert_eq!(quality.small_commits, 2);
        assert_eq!(quality.medium_commits, 2);
        assert_eq!(quality.large_commits, 1);
        let rest = (quality.medium_commits + quality.large_commits) as f64 / 5.0;
        assert_eq!(quality.small_commit_ratio + rest, 1.0);
        // 0.4 small with medium present
        assert_eq!(quality.quality_score, 0.8);
        assert!((quality.average_commit_size - 81.6).abs() < 1e-9);
    }

    #[test]
    fn test_quality_score_rules() {
        let tiny: Vec<_> = (0..10).map(|d| commit("a", d, 10, 5)).collect();
        assert_eq!(analyze_commit_quality(&tiny).quality_score, 0.4);

        let huge: Vec<_> = (0..4).map(|d| commit("a", d, 10, 400)).collect();
        assert_eq!(analyze_commit_quality(&huge).quality_score, 0.6);

        let medium_only: Vec<_> = (0..4).map(|d| commit("a", d, 10, 80)).collect();
        assert_eq!(analyze_commit_quality(&medium_only).quality_score, 0.7);
    }

    #[test]
    fn test_message_quality() {
        let commits = vec![
            commit_with_message("a", 0, 10, 60, "Add lexer for string literals"),
            commit_with_message("a", 1, 10, 60, "Fix typo in README"),
            commit_with_message("a", 2, 10, 60, "wip"),
            commit_with_message("a", 3, 10, 60, "UPDATED the parser tests"),
        ];
        let quality = analyze_commit_quality(&commits);
        assert_eq!(quality.message_quality_ratio, 0.25);
    }

    #[test]
    fn test_late_night_wraps_midnight() {
        assert!(is_late_night(23));
        assert!(is_late_night(0));
        assert!(is_late_night(5));
        assert!(!is_late_night(6));
        assert!(!is_late_night(22));
        assert!(!is_late_night(12));
    }

    #[test]
    fn test_time_distribution() {
        let commits = vec![
            commit("a", 0, 23, 60),
            commit("a", 1, 2, 60),
            commit("a", 2, 9, 60),
            commit("a", 3, 15, 60),
            commit("a", 4, 20, 60),
            commit("a", 5, 22, 60),
        ];
        let temporal = analyze_temporal_patterns(&commits, &course());
        assert_eq!(temporal.time_distribution.late_night, 2);
        assert_eq!(temporal.time_distribution.morning, 1);
        assert_eq!(temporal.time_distribution.afternoon, 1);
        assert_eq!(temporal.time_distribution.evening, 2);
        assert!((temporal.late_night_work_ratio - 2.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_procrastination_boundary() {
        // 105-day course: final third starts at day 70
        let commits = vec![
            commit("a", 69, 23, 60),
            commit("a", 70, 0, 60),
            commit("a", 100, 12, 60),
            commit("a", 10, 12, 60),
        ];
        let temporal = analyze_temporal_patterns(&commits, &course());
        assert_eq!(temporal.final_third_commits, 2);
        assert_eq!(temporal.procrastination_indicator, 0.5);
    }

    #[test]
    fn test_week_buckets_discard_out_of_range() {
        let course = course();
        let commits = vec![
            commit("a", -1, 12, 60),
            commit("a", 0, 0, 60),
            commit("a", 6, 23, 60),
            commit("a", 7, 0, 60),
            commit("a", 104, 12, 60),
            commit("a", 105, 12, 60),
        ];
        let progress = track_progress(&commits, &course);
        let weeks: Vec<i64> = progress.weekly_breakdown.keys().copied().collect();
        assert_eq!(weeks, vec![0, 1, 14]);
        assert_eq!(progress.weekly_breakdown[&0].commits, 2);
        assert_eq!(progress.weekly_breakdown[&0].changes, 120);
        assert_eq!(progress.active_weeks, 3);
        assert!((progress.active_weeks_ratio - 0.2).abs() < 1e-9);
        assert!((progress.average_commits_per_week - 6.0 / 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_fraction_before_start_is_dropped() {
        let course = course();
        let mut early = commit("a", 0, 0, 60);
        early.timestamp = (course.start_date - Duration::milliseconds(500)).fixed_offset();
        assert_eq!(week_index(early.timestamp, &course), -1);

        let progress = track_progress(&[early], &course);
        assert!(progress.weekly_breakdown.is_empty());
        assert_eq!(progress.active_weeks, 0);
    }

    #[test]
    fn test_hour_buckets_use_recorded_offset() {
        // 22:30 UTC, but 00:30 on the author's clock
        let mut local = commit("a", 18, 0, 60);
        local.timestamp = DateTime::parse_from_rfc3339("2025-02-02T00:30:00+02:00").unwrap();
        let temporal = analyze_temporal_patterns(&[local], &course());
        assert_eq!(temporal.time_distribution.late_night, 1);
        assert_eq!(temporal.time_distribution.evening, 0);
    }

    #[test]
    fn test_huge_sizes_saturate() {
        let mut big = commit("a", 1, 10, 0);
        big.changes = CommitChanges::new(u64::MAX, 0, 1).unwrap();
        let commits = vec![big.clone(), big];

        let quality = analyze_commit_quality(&commits);
        assert_eq!(quality.large_commits, 2);

        let progress = track_progress(&commits, &course());
        assert_eq!(progress.weekly_breakdown[&0].changes, u64::MAX);
    }

    #[test]
    fn test_trend_declining_and_increasing() {
        // Midpoint week 7 for a 15-week course
        let mut declining = Vec::new();
        for week in 0..4 {
            for n in 0..4 {
                declining.push(commit("a", week * 7 + n, 12, 60));
            }
        }
        declining.push(commit("a", 10 * 7, 12, 60));
        assert_eq!(
            track_progress(&declining, &course()).trend,
            ProgressTrend::Declining
        );

        let mut increasing = vec![commit("a", 0, 12, 60)];
        for week in 8..12 {
            for n in 0..3 {
                increasing.push(commit("a", week * 7 + n, 12, 60));
            }
        }
        assert_eq!(
            track_progress(&increasing, &course()).trend,
            ProgressTrend::Increasing
        );

        let steady: Vec<_> = (0..15).map(|w| commit("a", w * 7, 12, 60)).collect();
        assert_eq!(track_progress(&steady, &course()).trend, ProgressTrend::Stable);
    }

    #[test]
    fn test_derive_echoes_weekly_target() {
        let thresholds = Thresholds {
            min_commits_per_week: 3.0,
            ..Thresholds::default()
        };
        let metrics = CommitFeatureDeriver::derive(&[commit("a", 1, 10, 60)], &course(), &thresholds);
        assert_eq!(metrics.weekly_commit_target, 3.0);
        assert_eq!(metrics.activity_pattern.total_commits, 1);
    }
}
