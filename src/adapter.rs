//! Dataset adapter
//!
//! Parses the course dataset JSON into validated projects. Each actor is adapted
//! independently: a malformed commit rejects only its own actor, which is kept in
//! the dataset as a failure marker so aggregation can continue.

use crate::error::MonitorError;
use crate::types::{
    ActorFailure, ActorOutcome, Commit, CommitChanges, CourseDataset, CourseInfo,
    IndividualProject, TeamProject,
};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Accepted naive date-time layouts, interpreted as UTC
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
];

#[derive(Debug, Deserialize)]
struct RawCourseInfo {
    start_date: String,
    end_date: String,
    #[serde(default)]
    duration_weeks: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RawChanges {
    additions: u64,
    deletions: u64,
    files_changed: u64,
    #[serde(default)]
    total_changes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    commit_id: String,
    repository: String,
    author: String,
    timestamp: String,
    message: String,
    changes: RawChanges,
    branch: String,
}

#[derive(Debug, Deserialize)]
struct RawIndividualProject {
    student_id: String,
    repository: String,
    commits: Vec<RawCommit>,
    #[serde(default)]
    pattern_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTeamProject {
    team_id: String,
    repository: String,
    members: Vec<String>,
    commits: Vec<RawCommit>,
}

/// Parse a timestamp as RFC 3339, a naive ISO-8601 date-time, or a plain date
///
/// An explicit offset is kept as recorded; naive inputs are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().fixed_offset());
        }
    }

    Err(format!("unparseable timestamp {raw:?}"))
}

/// Parse a full dataset JSON string
pub fn parse_dataset(json: &str) -> Result<CourseDataset, MonitorError> {
    let value: Value = serde_json::from_str(json)?;
    adapt_dataset(value)
}

/// Adapt an already-parsed JSON value
///
/// Fails as a whole only when the root is not an object or `course_info` is invalid.
pub fn adapt_dataset(value: Value) -> Result<CourseDataset, MonitorError> {
    let Value::Object(mut root) = value else {
        return Err(MonitorError::InvalidCourse(
            "dataset root must be a JSON object".to_string(),
        ));
    };

    let course_value = root
        .remove("course_info")
        .ok_or_else(|| MonitorError::InvalidCourse("missing course_info".to_string()))?;
    let course_info = adapt_course_info(course_value)?;

    let individual_projects = take_array(&mut root, "individual_projects")?
        .into_iter()
        .enumerate()
        .map(|(index, value)| outcome(adapt_individual(index, value)))
        .collect();

    let team_projects = take_array(&mut root, "team_projects")?
        .into_iter()
        .enumerate()
        .map(|(index, value)| outcome(adapt_team(index, value)))
        .collect();

    Ok(CourseDataset {
        course_info,
        individual_projects,
        team_projects,
    })
}

fn outcome<T>(result: Result<T, ActorFailure>) -> ActorOutcome<T> {
    match result {
        Ok(project) => ActorOutcome::Analyzed(project),
        Err(failure) => {
            warn!(actor = %failure.id, error = %failure.error, "rejected malformed actor");
            ActorOutcome::Failed(failure)
        }
    }
}

/// A missing list is treated as empty
fn take_array(
    root: &mut serde_json::Map<String, Value>,
    key: &str,
) -> Result<Vec<Value>, MonitorError> {
    match root.remove(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(MonitorError::InvalidCourse(format!("{key} must be an array"))),
    }
}

fn adapt_course_info(value: Value) -> Result<CourseInfo, MonitorError> {
    let raw: RawCourseInfo = serde_json::from_value(value)
        .map_err(|e| MonitorError::InvalidCourse(e.to_string()))?;
    let start = parse_timestamp(&raw.start_date)
        .map_err(MonitorError::InvalidCourse)?
        .with_timezone(&Utc);
    let end = parse_timestamp(&raw.end_date)
        .map_err(MonitorError::InvalidCourse)?
        .with_timezone(&Utc);
    let course = CourseInfo::new(start, end)?;

    if let Some(declared) = raw.duration_weeks {
        if declared != course.duration_weeks {
            warn!(
                declared,
                computed = course.duration_weeks,
                "course duration_weeks disagrees with dates; using dates"
            );
        }
    }
    Ok(course)
}

/// Identifier used in failure markers when the record itself is unusable
fn actor_label(value: &Value, id_key: &str, list: &str, index: usize) -> (String, Option<String>) {
    let id = value
        .get(id_key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{list}[{index}]"));
    let repository = value
        .get("repository")
        .and_then(Value::as_str)
        .map(str::to_string);
    (id, repository)
}

fn adapt_individual(index: usize, value: Value) -> Result<IndividualProject, ActorFailure> {
    let (id, repository) = actor_label(&value, "student_id", "individual_projects", index);
    let fail = |error: MonitorError| ActorFailure {
        id: id.clone(),
        repository: repository.clone(),
        error: error.to_string(),
    };

    let raw: RawIndividualProject =
        serde_json::from_value(value).map_err(|e| fail(MonitorError::malformed(&id, e.to_string())))?;
    let commits = adapt_commits(&raw.student_id, raw.commits).map_err(fail)?;

    Ok(IndividualProject {
        student_id: raw.student_id,
        repository: raw.repository,
        commits,
        pattern_type: raw.pattern_type,
    })
}

fn adapt_team(index: usize, value: Value) -> Result<TeamProject, ActorFailure> {
    let (id, repository) = actor_label(&value, "team_id", "team_projects", index);
    let fail = |error: MonitorError| ActorFailure {
        id: id.clone(),
        repository: repository.clone(),
        error: error.to_string(),
    };

    let raw: RawTeamProject =
        serde_json::from_value(value).map_err(|e| fail(MonitorError::malformed(&id, e.to_string())))?;
    let commits = adapt_commits(&raw.team_id, raw.commits).map_err(fail)?;

    Ok(TeamProject {
        team_id: raw.team_id,
        repository: raw.repository,
        members: raw.members,
        commits,
    })
}

/// Validate every commit and return them in time order
fn adapt_commits(actor: &str, raw: Vec<RawCommit>) -> Result<Vec<Commit>, MonitorError> {
    let mut commits = raw
        .into_iter()
        .map(|c| adapt_commit(actor, c))
        .collect::<Result<Vec<_>, _>>()?;
    commits.sort_by_key(|c| c.timestamp);
    Ok(commits)
}

fn adapt_commit(actor: &str, raw: RawCommit) -> Result<Commit, MonitorError> {
    let timestamp = parse_timestamp(&raw.timestamp)
        .map_err(|e| MonitorError::malformed(actor, format!("commit {}: {e}", raw.commit_id)))?;

    let changes = CommitChanges::new(
        raw.changes.additions,
        raw.changes.deletions,
        raw.changes.files_changed,
    )
    .ok_or_else(|| {
        MonitorError::malformed(
            actor,
            format!("commit {}: additions + deletions overflows", raw.commit_id),
        )
    })?;
    if let Some(declared) = raw.changes.total_changes {
        if declared != changes.total_changes {
            return Err(MonitorError::malformed(
                actor,
                format!(
                    "commit {}: total_changes {declared} != additions + deletions {}",
                    raw.commit_id, changes.total_changes
                ),
            ));
        }
    }

    Ok(Commit {
        id: raw.commit_id,
        repository: raw.repository,
        author: raw.author,
        timestamp,
        message: raw.message,
        changes,
        branch: raw.branch,
    })
}
