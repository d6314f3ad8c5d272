//! Shared fixtures for unit tests

use crate::types::{Commit, CommitChanges, CourseInfo, IndividualProject, TeamProject};
use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

/// 2025-01-15 .. 2025-04-30: 105 days, 15 weeks
pub fn course() -> CourseInfo {
    CourseInfo::new(
        Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2025, 4, 30, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

/// Timestamp `day` days and `hour` hours after course start
pub fn at(day: i64, hour: i64) -> DateTime<FixedOffset> {
    (course().start_date + Duration::days(day) + Duration::hours(hour)).fixed_offset()
}

pub fn commit(author: &str, day: i64, hour: i64, size: u64) -> Commit {
    commit_with_message(author, day, hour, size, "Implement parser for config section")
}

pub fn commit_with_message(author: &str, day: i64, hour: i64, size: u64, message: &str) -> Commit {
    Commit {
        id: format!("{author}-{day}-{hour}"),
        repository: format!("{author}_project"),
        author: author.to_string(),
        timestamp: at(day, hour),
        message: message.to_string(),
        changes: CommitChanges::new(size, 0, 1).unwrap(),
        branch: "main".to_string(),
    }
}

pub fn individual(id: &str, commits: Vec<Commit>) -> IndividualProject {
    IndividualProject {
        student_id: id.to_string(),
        repository: format!("{id}_project"),
        commits,
        pattern_type: None,
    }
}

pub fn team(id: &str, members: &[&str], commits: Vec<Commit>) -> TeamProject {
    TeamProject {
        team_id: id.to_string(),
        repository: format!("{id}_project"),
        members: members.iter().map(|m| m.to_string()).collect(),
        commits,
    }
}
