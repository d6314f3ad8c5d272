//! Pipeline orchestration
//!
//! Public entry points that run the full flow from dataset JSON to a course
//! report: adapter → extractors → flag detector → severity → aggregation.

use crate::adapter::parse_dataset;
use crate::config::Thresholds;
use crate::course::analyze_course;
use crate::error::MonitorError;
use crate::types::{CourseDataset, CourseReport};

/// Convert a course dataset JSON string into a report JSON string (stateless, one-shot).
///
/// # Example
/// ```ignore
/// let report_json = course_report_from_json(&dataset_json, &Thresholds::default())?;
/// ```
pub fn course_report_from_json(
    dataset_json: &str,
    thresholds: &Thresholds,
) -> Result<String, MonitorError> {
    CourseMonitor::with_thresholds(*thresholds).process_to_json(dataset_json)
}

/// Reusable analysis front-end holding the thresholds for its runs.
///
/// Thresholds are fixed at construction and never change while a run is in progress.
#[derive(Debug, Clone, Default)]
pub struct CourseMonitor {
    thresholds: Thresholds,
    pretty: bool,
}

impl CourseMonitor {
    /// Create a monitor with default thresholds
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a monitor with explicit thresholds
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            pretty: false,
        }
    }

    /// Emit indented JSON from [`CourseMonitor::process_to_json`]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Analyze an adapted dataset
    pub fn analyze(&self, dataset: &CourseDataset) -> CourseReport {
        analyze_course(dataset, &self.thresholds)
    }

    /// Parse and analyze a dataset JSON string
    pub fn process(&self, dataset_json: &str) -> Result<CourseReport, MonitorError> {
        let dataset = parse_dataset(dataset_json)?;
        Ok(self.analyze(&dataset))
    }

    /// Parse, analyze, and encode the report as JSON
    pub fn process_to_json(&self, dataset_json: &str) -> Result<String, MonitorError> {
        let report = self.process(dataset_json)?;
        let encoded = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        encoded.map_err(|e| MonitorError::Encoding(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset_json() -> &'static str {
        r#"{
            "course_info": {
                "start_date": "2025-01-15T00:00:00",
                "end_date": "2025-04-30T00:00:00",
                "duration_weeks": 15
            },
            "individual_projects": [
                {
                    "student_id": "student_000",
                    "repository": "student_000_project",
                    "pattern_type": "inactive",
                    "commits": []
                },
                {
                    "student_id": "student_001",
                    "repository": "student_001_project",
                    "commits": [
                        {
                            "commit_id": "a1b2c3d4",
                            "repository": "student_001_project",
                            "author": "student_001",
                            "timestamp": "2025-04-20T23:30:00Z",
                            "message": "Implement final report generator",
                            "changes": {"additions": 300, "deletions": 20, "files_changed": 6, "total_changes": 320},
                            "branch": "main"
                        },
                        {
                            "commit_id": "b2c3d4e5",
                            "repository": "student_001_project",
                            "author": "student_001",
                            "timestamp": "2025-04-22T01:10:00Z",
                            "message": "Add integration tests for exporter",
                            "changes": {"additions": 180, "deletions": 0, "files_changed": 3, "total_changes": 180},
                            "branch": "main"
                        }
                    ]
                }
            ],
            "team_projects": [
                {
                    "team_id": "team_0",
                    "repository": "team_0_project",
                    "members": ["m0", "m1"],
                    "commits": [
                        {
                            "commit_id": "c3d4e5f6",
                            "repository": "team_0_project",
                            "author": "m0",
                            "timestamp": "2025-02-01T10:00:00Z",
                            "message": "Set up project skeleton",
                            "changes": {"additions": 120, "deletions": 0, "files_changed": 8, "total_changes": 120},
                            "branch": "main"
                        }
                    ]
                }
            ]
        }"#
    }

    #[test]
    fn test_course_report_from_json() {
        let json = course_report_from_json(sample_dataset_json(), &Thresholds::default()).unwrap();
        let report: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(report["summary"]["total_students"], 2);
        assert_eq!(report["summary"]["total_teams"], 1);
        assert_eq!(report["summary"]["severity_breakdown"]["high"], 2);
        assert_eq!(report["individual_analyses"][0]["flags"][0]["type"], "inactive");
        assert_eq!(report["individual_analyses"][0]["pattern_type"], "inactive");
        assert!(report["individual_analyses"][0].get("metrics").is_none());

        let late = &report["individual_analyses"][1];
        assert_eq!(late["metrics"]["temporal_analysis"]["procrastination_indicator"], 1.0);
        assert_eq!(late["metrics"]["temporal_analysis"]["late_night_work_ratio"], 1.0);

        let team = &report["team_analyses"][0];
        assert_eq!(team["member_contributions"][0]["commit_percentage"], 100.0);
        assert_eq!(team["flags"][0]["type"], "contribution_imbalance");
        assert_eq!(team["flags"][1]["type"], "low_contributor");

        assert_eq!(report["priority_interventions"][0]["rank"], 1);
    }

    #[test]
    fn test_monitor_uses_overrides() {
        let lenient = Thresholds {
            low_progress_threshold: 0.0,
            procrastination_threshold: 1.0,
            late_night_ratio: 1.0,
            ..Thresholds::default()
        };
        let report = CourseMonitor::with_thresholds(lenient)
            .process(sample_dataset_json())
            .unwrap();
        let late = report.individual_analyses[1].analyzed().unwrap();
        assert!(late.flags.is_empty());
    }

    #[test]
    fn test_pretty_output() {
        let json = CourseMonitor::new()
            .pretty(true)
            .process_to_json(sample_dataset_json())
            .unwrap();
        assert!(json.contains("\n  \"report_id\""));
    }

    #[test]
    fn test_invalid_json() {
        let result = course_report_from_json("not valid json", &Thresholds::default());
        assert!(matches!(result, Err(MonitorError::Json(_))));
    }
}
