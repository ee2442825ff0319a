use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::{GoalStatus, JobSearchGoal};
use super::progress::percent_complete;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson, AppPath};
use crate::resources::crud::update_checked;
use crate::state::AppState;
use crate::store::{Collection, Stored};

/// Either sets the progress outright or adds to it.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub current_value: Option<f64>,
    pub increment: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgressResponse {
    pub goal: Stored<JobSearchGoal>,
    pub percent_complete: f64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSummary {
    pub total: usize,
    pub active: usize,
    pub completed: usize,
    pub archived: usize,
    /// Mean completion over active goals.
    pub average_progress: f64,
}

/// PATCH /api/goals/:id/progress
pub async fn handle_update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<Uuid>,
    AppJson(update): AppJson<ProgressUpdate>,
) -> Result<Json<GoalProgressResponse>, AppError> {
    let goals = Collection::<JobSearchGoal>::new(state.store.as_ref());
    let existing = goals.get(&user.user_id, id).await?;

    let mut body = existing.data.clone();
    body.current_value = match (update.current_value, update.increment) {
        (Some(value), None) => value,
        (None, Some(delta)) => existing.data.current_value + delta,
        _ => {
            return Err(AppError::Validation(
                "provide exactly one of currentValue or increment".to_string(),
            ))
        }
    };

    let goal = update_checked(&goals, &user.user_id, id, body).await?;
    let percent_complete = percent_complete(&goal.data);
    Ok(Json(GoalProgressResponse {
        goal,
        percent_complete,
    }))
}

/// GET /api/goals/summary
pub async fn handle_goal_summary(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<GoalSummary>, AppError> {
    let goals = Collection::<JobSearchGoal>::new(state.store.as_ref())
        .list(&user.user_id)
        .await?;
    Ok(Json(summarize(goals.iter().map(|g| &g.data))))
}

pub fn summarize<'a>(goals: impl Iterator<Item = &'a JobSearchGoal>) -> GoalSummary {
    let mut summary = GoalSummary::default();
    let mut progress_sum = 0.0;
    for goal in goals {
        summary.total += 1;
        match goal.status {
            GoalStatus::Active => {
                summary.active += 1;
                progress_sum += percent_complete(goal);
            }
            GoalStatus::Completed => summary.completed += 1,
            GoalStatus::Archived => summary.archived += 1,
        }
    }
    if summary.active > 0 {
        summary.average_progress = progress_sum / summary.active as f64;
    }
    summary
}
