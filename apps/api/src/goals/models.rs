use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::progress::settle_status;
use crate::errors::AppError;
use crate::resources::{require, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    #[default]
    Active,
    Completed,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobSearchGoal {
    pub title: String,
    pub description: Option<String>,
    /// e.g. applications, networking, interviews
    pub category: Option<String>,
    pub target_value: f64,
    pub current_value: f64,
    /// e.g. "applications", "coffee chats"
    pub unit: String,
    pub deadline: Option<NaiveDate>,
    pub status: GoalStatus,
    /// Server-managed; set when the goal first reaches its target.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Resource for JobSearchGoal {
    const COLLECTION: &'static str = "goals";
    const NAME: &'static str = "Goal";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.title, "title")?;
        require(&self.unit, "unit")?;
        if !self.target_value.is_finite() || self.target_value <= 0.0 {
            return Err(AppError::Validation(
                "targetValue must be a finite number greater than 0".to_string(),
            ));
        }
        if !self.current_value.is_finite() {
            return Err(AppError::Validation(
                "currentValue must be a finite number".to_string(),
            ));
        }
        if self.current_value < 0.0 {
            return Err(AppError::Validation(
                "currentValue cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn prepare_create(mut self) -> Self {
        self.completed_at = None;
        settle_status(&mut self, None, Utc::now());
        self
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        self.completed_at = existing.completed_at;
        settle_status(&mut self, Some(existing), Utc::now());
        self
    }
}

/// A dated achievement on the way to a job, optionally tied to a goal.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct JobSearchMilestone {
    pub title: String,
    pub description: Option<String>,
    pub goal_id: Option<Uuid>,
    pub achieved_at: Option<DateTime<Utc>>,
}

impl Resource for JobSearchMilestone {
    const COLLECTION: &'static str = "milestones";
    const NAME: &'static str = "Milestone";

    fn validate(&self) -> Result<(), AppError> {
        require(&self.title, "title")
    }

    fn prepare_create(mut self) -> Self {
        self.achieved_at.get_or_insert_with(Utc::now);
        self
    }

    fn prepare_update(mut self, existing: &Self) -> Self {
        if self.achieved_at.is_none() {
            self.achieved_at = existing.achieved_at;
        }
        self
    }
}
