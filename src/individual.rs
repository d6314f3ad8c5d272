//! Individual actor analysis
//!
//! Orchestrates extractors, flag detection, and severity/recommendation mapping
//! for one actor. A project without commits short-circuits to the inactive alert.

use crate::config::Thresholds;
use crate::features::CommitFeatureDeriver;
use crate::flags::{detect_flags, inactive_flag};
use crate::severity::{calculate_severity, individual_recommendations};
use crate::types::{AnalysisResult, CourseInfo, IndividualProject, Severity};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Analyze one individual project, stamping the result with the current time
pub fn analyze_individual(
    project: &IndividualProject,
    course: &CourseInfo,
    thresholds: &Thresholds,
) -> AnalysisResult {
    analyze_individual_at(project, course, thresholds, Utc::now())
}

/// Analyze one individual project with an explicit analysis timestamp
pub fn analyze_individual_at(
    project: &IndividualProject,
    course: &CourseInfo,
    thresholds: &Thresholds,
    analysis_date: DateTime<Utc>,
) -> AnalysisResult {
    if project.commits.is_empty() {
        debug!(student_id = %project.student_id, "no commits, raising inactive alert");
        let flag = inactive_flag();
        let severity = Severity::from(flag.severity);
        let flags = vec![flag];
        return AnalysisResult {
            student_id: project.student_id.clone(),
            repository: project.repository.clone(),
            pattern_type: project.pattern_type.clone(),
            analysis_date,
            total_commits: 0,
            severity,
            recommendations: individual_recommendations(&flags),
            flags,
            metrics: None,
        };
    }

    let metrics = CommitFeatureDeriver::derive(&project.commits, course, thresholds);
    let flags = detect_flags(&metrics, thresholds);
    let severity = calculate_severity(&flags);
    let recommendations = individual_recommendations(&flags);

    debug!(
        student_id = %project.student_id,
        commits = project.commits.len(),
        flags = flags.len(),
        severity = severity.as_str(),
        "analyzed individual project"
    );

    AnalysisResult {
        student_id: project.student_id.clone(),
        repository: project.repository.clone(),
        pattern_type: project.pattern_type.clone(),
        analysis_date,
        total_commits: project.commits.len(),
        flags,
        severity,
        recommendations,
        metrics: Some(metrics),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::HEALTHY_INDIVIDUAL_MESSAGE;
    use crate::testutil::{commit, course, individual};
    use crate::types::{FlagSeverity, FlagType, MetricValue, ProgressTrend};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_commits_single_inactive_flag() {
        let project = individual("student_000", vec![]);
        let strict = Thresholds {
            inactivity_days: 0.0,
            low_progress_threshold: 1.0,
            ..Thresholds::default()
        };
        for thresholds in [Thresholds::default(), strict] {
            let result = analyze_individual(&project, &course(), &thresholds);
            assert_eq!(result.flags.len(), 1);
            assert_eq!(result.flags[0].flag_type, FlagType::Inactive);
            assert_eq!(result.flags[0].severity, FlagSeverity::High);
            assert_eq!(result.flags[0].metric_value, MetricValue::Number(0.0));
            assert_eq!(result.severity, Severity::High);
            assert_eq!(result.total_commits, 0);
            assert!(result.metrics.is_none());
            assert!(result.recommendations[0].starts_with("URGENT"));
        }
    }

    #[test]
    fn test_single_commit_scenario() {
        let project = individual("student_001", vec![commit("student_001", 3, 14, 80)]);
        let result = analyze_individual(&project, &course(), &Thresholds::default());
        let metrics = result.metrics.as_ref().unwrap();
        assert_eq!(metrics.activity_pattern.longest_gap_days, 0);
        assert_eq!(metrics.activity_pattern.consistency_score, 0.5);
        assert_eq!(metrics.progress_tracking.trend, ProgressTrend::InsufficientData);
        // 1 of 15 weeks active
        assert_eq!(result.flags[0].flag_type, FlagType::LowProgress);
    }

    #[test]
    fn test_late_burst_scenario() {
        // Commits only on days 95..=104, all large
        let commits: Vec<_> = (95..105).map(|d| commit("student_002", d, 15, 200)).collect();
        let project = individual("student_002", commits);
        let result = analyze_individual(&project, &course(), &Thresholds::default());

        let types: Vec<FlagType> = result.flags.iter().map(|f| f.flag_type).collect();
        assert!(types.contains(&FlagType::Procrastination));
        assert!(!types.contains(&FlagType::MinimalProgress));
        assert!(result.severity >= Severity::Medium);
    }

    #[test]
    fn test_steady_student_is_healthy() {
        let commits: Vec<_> = (0..35)
            .map(|i| commit("student_003", i * 3, 10 + (i % 8), if i % 2 == 0 { 30 } else { 90 }))
            .collect();
        let project = individual("student_003", commits);
        let result = analyze_individual(&project, &course(), &Thresholds::default());
        assert!(result.flags.is_empty(), "unexpected flags: {:?}", result.flags);
        assert_eq!(result.severity, Severity::None);
        assert_eq!(result.recommendations, vec![HEALTHY_INDIVIDUAL_MESSAGE.to_string()]);
    }

    #[test]
    fn test_idempotent_for_fixed_date() {
        let commits: Vec<_> = (0..12).map(|i| commit("student_004", i * 9, 23, 20)).collect();
        let project = individual("student_004", commits);
        let when = Utc::now();
        let first = analyze_individual_at(&project, &course(), &Thresholds::default(), when);
        let second = analyze_individual_at(&project, &course(), &Thresholds::default(), when);
        assert_eq!(first, second);
    }

    #[test]
    fn test_pattern_type_is_echoed() {
        let mut project = individual("student_005", vec![commit("student_005", 1, 9, 60)]);
        project.pattern_type = Some("procrastinator".to_string());
        let result = analyze_individual(&project, &course(), &Thresholds::default());
        assert_eq!(result.pattern_type.as_deref(), Some("procrastinator"));
    }
}
