//! Team analysis
//!
//! Computes per-member contribution shares and same-day collaboration overlap.
//! Unlike individual analysis this deliberately correlates members of one team.

use crate::flags::detect_team_flags;
use crate::severity::{calculate_severity, team_recommendations};
use crate::types::{
    CollaborationMetrics, Commit, CourseInfo, MemberContribution, TeamAnalysisResult, TeamProject,
};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Analyze one team project, stamping the result with the current time
pub fn analyze_team(project: &TeamProject, course: &CourseInfo) -> TeamAnalysisResult {
    analyze_team_at(project, course, Utc::now())
}

/// Analyze one team project with an explicit analysis timestamp
pub fn analyze_team_at(
    project: &TeamProject,
    _course: &CourseInfo,
    analysis_date: DateTime<Utc>,
) -> TeamAnalysisResult {
    let outsiders = project
        .commits
        .iter()
        .filter(|c| !project.members.contains(&c.author))
        .count();
    if outsiders > 0 {
        warn!(
            team_id = %project.team_id,
            outsiders,
            "team log contains commits by undeclared authors"
        );
    }

    let member_contributions = member_contributions(&project.commits, &project.members);
    let percentages: Vec<f64> = member_contributions
        .iter()
        .map(|m| m.commit_percentage)
        .collect();
    let flags = detect_team_flags(&percentages);
    let severity = calculate_severity(&flags);
    let recommendations = team_recommendations(&flags);
    let collaboration_metrics = collaboration_metrics(&project.commits);

    debug!(
        team_id = %project.team_id,
        commits = project.commits.len(),
        flags = flags.len(),
        "analyzed team project"
    );

    TeamAnalysisResult {
        team_id: project.team_id.clone(),
        repository: project.repository.clone(),
        members: project.members.clone(),
        analysis_date,
        total_commits: project.commits.len(),
        member_contributions,
        collaboration_metrics,
        flags,
        severity,
        recommendations,
    }
}

/// One record per declared member, in declared order
///
/// Members absent from the log receive a zero-valued record.
pub fn member_contributions(commits: &[Commit], members: &[String]) -> Vec<MemberContribution> {
    let total = commits.len();

    members
        .iter()
        .map(|member| {
            let (count, changes) = commits
                .iter()
                .filter(|c| &c.author == member)
                .fold((0usize, 0u64), |(n, lines), c| {
                    (n + 1, lines.saturating_add(c.changes.total_changes))
                });

            MemberContribution {
                member: member.clone(),
                commit_count: count,
                commit_percentage: if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                },
                total_changes: changes,
                average_commit_size: if count == 0 {
                    0.0
                } else {
                    changes as f64 / count as f64
                },
            }
        })
        .collect()
}

/// Share of active calendar days on which two or more distinct authors committed
///
/// Days are the calendar date on each author's recorded clock, without converting
/// offsets to UTC.
pub fn collaboration_metrics(commits: &[Commit]) -> CollaborationMetrics {
    let mut daily: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
    for commit in commits {
        daily
            .entry(commit.timestamp.date_naive())
            .or_default()
            .insert(commit.author.as_str());
    }

    let total_active_days = daily.len();
    let collaborative_days = daily.values().filter(|authors| authors.len() >= 2).count();

    CollaborationMetrics {
        collaborative_days,
        total_active_days,
        collaboration_ratio: if total_active_days == 0 {
            0.0
        } else {
            collaborative_days as f64 / total_active_days as f64
        },
    }
}
