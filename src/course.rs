//! Course-level aggregation
//!
//! Runs every individual and team analysis, then builds summary statistics and
//! the ranked intervention list. Actors rejected by the adapter pass through as
//! failure markers and never abort the run.

use crate::config::Thresholds;
use crate::individual::analyze_individual_at;
use crate::team::analyze_team_at;
use crate::types::{
    ActorOutcome, AnalysisResult, CourseDataset, CourseReport, CourseSummary, FlagFrequency,
    PriorityIntervention, Severity, SeverityBreakdown, TeamAnalysisResult,
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

/// Number of flag types listed in `most_common_flags`
pub const TOP_FLAG_COUNT: usize = 5;

/// Maximum length of the intervention list
pub const MAX_PRIORITY_INTERVENTIONS: usize = 20;

/// Analyze a full course dataset
pub fn analyze_course(dataset: &CourseDataset, thresholds: &Thresholds) -> CourseReport {
    analyze_course_at(dataset, thresholds, Utc::now())
}

/// Analyze a full course dataset with an explicit analysis timestamp
pub fn analyze_course_at(
    dataset: &CourseDataset,
    thresholds: &Thresholds,
    analysis_date: DateTime<Utc>,
) -> CourseReport {
    let course = &dataset.course_info;

    let individual_analyses: Vec<ActorOutcome<AnalysisResult>> = dataset
        .individual_projects
        .iter()
        .map(|outcome| match outcome {
            ActorOutcome::Analyzed(project) => ActorOutcome::Analyzed(analyze_individual_at(
                project,
                course,
                thresholds,
                analysis_date,
            )),
            ActorOutcome::Failed(failure) => ActorOutcome::Failed(failure.clone()),
        })
        .collect();

    let team_analyses: Vec<ActorOutcome<TeamAnalysisResult>> = dataset
        .team_projects
        .iter()
        .map(|outcome| match outcome {
            ActorOutcome::Analyzed(project) => {
                ActorOutcome::Analyzed(analyze_team_at(project, course, analysis_date))
            }
            ActorOutcome::Failed(failure) => ActorOutcome::Failed(failure.clone()),
        })
        .collect();

    let analyzed: Vec<&AnalysisResult> = individual_analyses
        .iter()
        .filter_map(ActorOutcome::analyzed)
        .collect();

    let summary = summarize(&individual_analyses, &team_analyses);
    let priority_interventions = prioritize_interventions(&analyzed);

    info!(
        students = summary.total_students,
        teams = summary.total_teams,
        needing_attention = summary.students_needing_attention,
        failed = summary.failed_analyses,
        "course analysis complete"
    );

    CourseReport {
        report_id: Uuid::new_v4().to_string(),
        course_info: course.clone(),
        analysis_date,
        summary,
        individual_analyses,
        team_analyses,
        priority_interventions,
    }
}

/// Severity counts, attention count, and the top flag types
pub fn summarize(
    individuals: &[ActorOutcome<AnalysisResult>],
    teams: &[ActorOutcome<TeamAnalysisResult>],
) -> CourseSummary {
    let analyzed: Vec<&AnalysisResult> = individuals
        .iter()
        .filter_map(ActorOutcome::analyzed)
        .collect();

    let mut breakdown = SeverityBreakdown::default();
    for result in &analyzed {
        match result.severity {
            Severity::High => breakdown.high += 1,
            Severity::Medium => breakdown.medium += 1,
            Severity::Low => breakdown.low += 1,
            Severity::None => breakdown.none += 1,
        }
    }

    let failed_analyses = individuals.iter().filter(|o| o.is_failed()).count()
        + teams.iter().filter(|o| o.is_failed()).count();

    CourseSummary {
        total_students: individuals.len(),
        total_teams: teams.len(),
        students_needing_attention: breakdown.high + breakdown.medium,
        failed_analyses,
        severity_breakdown: breakdown,
        most_common_flags: most_common_flags(&analyzed, TOP_FLAG_COUNT),
    }
}

/// Flag-type histogram sorted by descending count; ties keep first-encountered order
pub fn most_common_flags(results: &[&AnalysisResult], limit: usize) -> Vec<FlagFrequency> {
    let mut counts: Vec<FlagFrequency> = Vec::new();
    for flag in results.iter().flat_map(|r| r.flags.iter()) {
        match counts.iter_mut().find(|c| c.flag_type == flag.flag_type) {
            Some(entry) => entry.count += 1,
            None => counts.push(FlagFrequency {
                flag_type: flag.flag_type,
                count: 1,
            }),
        }
    }

    // Stable sort preserves encounter order among equal counts
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

/// Rank flagged individuals by (severity, flag count), highest first
pub fn prioritize_interventions(results: &[&AnalysisResult]) -> Vec<PriorityIntervention> {
    let mut flagged: Vec<&AnalysisResult> = results
        .iter()
        .copied()
        .filter(|r| r.severity != Severity::None)
        .collect();

    flagged.sort_by(|a, b| {
        (b.severity.rank(), b.flags.len()).cmp(&(a.severity.rank(), a.flags.len()))
    });

    flagged
        .into_iter()
        .take(MAX_PRIORITY_INTERVENTIONS)
        .enumerate()
        .map(|(i, r)| PriorityIntervention {
            rank: i + 1,
            student_id: r.student_id.clone(),
            repository: r.repository.clone(),
            severity: r.severity,
            flag_count: r.flags.len(),
            primary_concern: r.flags.first().map(|f| f.flag_type),
            recommendations: r.recommendations.clone(),
        })
        .collect()
}
