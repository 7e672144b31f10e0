//! Keyword-driven goal progress assessment.

use serde::Serialize;

/// Reported when no goals are supplied at all.
pub const BASELINE_PROGRESS: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalAssessment {
    pub goal: String,
    pub progress: f64,
    pub assessment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgressReport {
    pub assessed_goals: Vec<GoalAssessment>,
    pub overall_progress: f64,
}

/// Split a comma-separated goal list, dropping blank entries.
pub fn parse_goal_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(String::from)
        .collect()
}

fn progress_for(goal: &str) -> f64 {
    let goal = goal.to_lowercase();
    if goal.contains("trust") {
        0.15
    } else if goal.contains("intimacy") {
        0.08
    } else if goal.contains("vulnerability") {
        0.12
    } else {
        0.10
    }
}

pub fn assess_goal(goal: &str) -> GoalAssessment {
    GoalAssessment {
        goal: goal.to_string(),
        progress: progress_for(goal),
        assessment: format!("Progress toward {goal} is steady"),
    }
}

/// Assess every goal; the overall figure is their mean rounded to three
/// decimals, or [`BASELINE_PROGRESS`] when there are none.
pub fn assess_goals<I, S>(goals: I) -> GoalProgressReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let assessed_goals: Vec<GoalAssessment> =
        goals.into_iter().map(|g| assess_goal(g.as_ref())).collect();

    let overall_progress = if assessed_goals.is_empty() {
        BASELINE_PROGRESS
    } else {
        let total: f64 = assessed_goals.iter().map(|a| a.progress).sum();
        round_to(total / assessed_goals.len() as f64, 3)
    };

    GoalProgressReport {
        assessed_goals,
        overall_progress,
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
