//! Goals owned by a single persona.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{ValidationError, clamp_or, normalize_id};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Paused,
    Completed,
    Abandoned,
}

impl fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GoalStatus::Active => "active",
            GoalStatus::Paused => "paused",
            GoalStatus::Completed => "completed",
            GoalStatus::Abandoned => "abandoned",
        };
        f.write_str(s)
    }
}

/// A relationship goal. Belongs to exactly one persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: String,
    pub persona_id: String,
    pub goal_type: String,
    pub description: String,
    /// Completion in `[0.0, 1.0]`.
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub target_persona: Option<String>,
    #[serde(default)]
    pub priority: GoalPriority,
    #[serde(default)]
    pub status: GoalStatus,
    #[serde(default)]
    pub strategies: Vec<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Goal {
    pub fn new(
        persona_id: impl Into<String>,
        goal_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            goal_id: format!("goal_{}", Uuid::new_v4().simple()),
            persona_id: persona_id.into(),
            goal_type: goal_type.into(),
            description: description.into(),
            progress: 0.0,
            target_persona: None,
            priority: GoalPriority::default(),
            status: GoalStatus::default(),
            strategies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = goal_id.into();
        self
    }

    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = clamp_or(progress, 0.0, 1.0, 0.0);
        self
    }

    pub fn with_target(mut self, target_persona: impl Into<String>) -> Self {
        self.target_persona = Some(target_persona.into());
        self
    }

    pub fn with_priority(mut self, priority: GoalPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: GoalStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_strategies<I, S>(mut self, strategies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strategies = strategies.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == GoalStatus::Active
    }

    pub fn normalized(mut self) -> Result<Self, ValidationError> {
        self.goal_id = self.goal_id.trim().to_string();
        if self.goal_id.is_empty() {
            return Err(ValidationError::new("goal_id is required"));
        }
        self.persona_id = normalize_id(&self.persona_id, "persona_id")?;
        self.target_persona = match self.target_persona.take() {
            Some(target) if !target.trim().is_empty() => {
                Some(normalize_id(&target, "target_persona")?)
            }
            _ => None,
        };
        self.progress = clamp_or(self.progress, 0.0, 1.0, 0.0);
        Ok(self)
    }
}
