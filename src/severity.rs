//! Severity aggregation and recommendation tables
//!
//! Recommendations are a static table of (flag-type predicate, message) pairs
//! evaluated in order. Every matching row contributes its message.

use crate::types::{Flag, FlagType, Severity};
use std::collections::HashSet;

/// Weighted total at or above which an actor is high severity
pub const HIGH_SEVERITY_SCORE: u32 = 5;

/// Weighted total at or above which an actor is medium severity
pub const MEDIUM_SEVERITY_SCORE: u32 = 3;

/// Aggregate flags into one severity (high=3, medium=2, low=1)
pub fn calculate_severity(flags: &[Flag]) -> Severity {
    let total: u32 = flags.iter().map(|f| f.severity.weight()).sum();
    match total {
        0 => Severity::None,
        t if t >= HIGH_SEVERITY_SCORE => Severity::High,
        t if t >= MEDIUM_SEVERITY_SCORE => Severity::Medium,
        _ => Severity::Low,
    }
}

/// One row of a recommendation table
pub struct RecommendationRule {
    /// Row fires when any of these flag types is present
    pub triggers: &'static [FlagType],
    pub message: &'static str,
}

impl RecommendationRule {
    fn applies(&self, present: &HashSet<FlagType>) -> bool {
        self.triggers.iter().any(|t| present.contains(t))
    }
}

pub const INDIVIDUAL_RECOMMENDATIONS: &[RecommendationRule] = &[
    RecommendationRule {
        triggers: &[FlagType::Inactivity, FlagType::LowProgress],
        message: "Reach out immediately - student may have dropped or be struggling",
    },
    RecommendationRule {
        triggers: &[FlagType::DecliningActivity],
        message: "Check in with student - activity declining, may need support or clarification",
    },
    RecommendationRule {
        triggers: &[FlagType::Procrastination],
        message: "Encourage earlier start on work - most progress happening near deadline",
    },
    RecommendationRule {
        triggers: &[FlagType::MinimalProgress],
        message: "Review commit content - many small commits may indicate confusion or lack of direction",
    },
    RecommendationRule {
        triggers: &[FlagType::BurnoutRisk],
        message: "Discuss time management - excessive late-night work may lead to burnout",
    },
    RecommendationRule {
        triggers: &[FlagType::IrregularPattern],
        message: "Suggest setting regular work schedule to maintain steady progress",
    },
    RecommendationRule {
        triggers: &[FlagType::Inactive],
        message: "URGENT: reach out to student immediately - no activity detected",
    },
];

pub const HEALTHY_INDIVIDUAL_MESSAGE: &str =
    "Student shows healthy work patterns - continue monitoring";

pub const TEAM_RECOMMENDATIONS: &[RecommendationRule] = &[
    RecommendationRule {
        triggers: &[FlagType::ContributionImbalance],
        message: "Address contribution imbalance - consider discussing workload distribution",
    },
    RecommendationRule {
        triggers: &[FlagType::LowContributor],
        message: "Check in with low-contributing member - may need support or task clarification",
    },
];

pub const BALANCED_TEAM_MESSAGE: &str =
    "Team contributions appear balanced - monitor for changes";

/// Evaluate a table against the set of flag types present
pub fn recommend(
    flags: &[Flag],
    table: &[RecommendationRule],
    fallback: &'static str,
) -> Vec<String> {
    let present: HashSet<FlagType> = flags.iter().map(|f| f.flag_type).collect();
    let mut recommendations: Vec<String> = table
        .iter()
        .filter(|rule| rule.applies(&present))
        .map(|rule| rule.message.to_string())
        .collect();

    if recommendations.is_empty() {
        recommendations.push(fallback.to_string());
    }
    recommendations
}

/// Recommendations for an individual actor
pub fn individual_recommendations(flags: &[Flag]) -> Vec<String> {
    recommend(flags, INDIVIDUAL_RECOMMENDATIONS, HEALTHY_INDIVIDUAL_MESSAGE)
}

/// Recommendations for a team
pub fn team_recommendations(flags: &[Flag]) -> Vec<String> {
    recommend(flags, TEAM_RECOMMENDATIONS, BALANCED_TEAM_MESSAGE)
}
