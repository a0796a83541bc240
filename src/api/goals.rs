use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::ai::{HealthSnapshot, PatientContext};
use crate::api::response::{self, ApiError, ApiResult};
use crate::api::AppState;
use crate::stores::goals::{GoalUpdate, NewGoalInput};
use crate::stores::users::UserRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<i64>,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub target_value: Option<f64>,
    pub current_value: Option<f64>,
    pub unit: Option<String>,
    pub deadline: Option<i64>,
    pub is_completed: Option<bool>,
    pub priority: Option<String>,
}

/// Goals plus the derived adherence rate and an inline recommendation.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<impl IntoResponse> {
    let goals = state.goals.list(user.id).await?;
    let summary = state.goals.summary(user.id).await?;
    let adherence_rate = summary.adherence_rate();

    let snapshot = HealthSnapshot {
        adherence_rate,
        active_goals_count: summary.total - summary.completed,
        completed_goals_count: summary.completed,
        condition: user.condition.clone(),
        ..Default::default()
    };
    let patient = PatientContext {
        name: user.name.clone(),
        age: user.age,
        condition: user.condition.clone(),
        created_at: user.created_at,
    };
    let ai_recommendation = state
        .insights
        .generate_recommendation(&patient, &snapshot)
        .await;

    Ok(response::data(json!({
        "goals": goals,
        "adherenceRate": adherence_rate,
        "aiRecommendation": ai_recommendation,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<CreateGoalRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(title), Some(category), Some(target_value)) =
        (req.title, req.category, req.target_value)
    else {
        return Err(ApiError::bad_request(
            "Title, category, and target value are required",
        ));
    };

    let goal = state
        .goals
        .create(
            user.id,
            NewGoalInput {
                title,
                description: req.description,
                category,
                target_value,
                current_value: req.current_value,
                unit: req.unit,
                deadline: req.deadline,
                priority: req.priority,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::message_data("Health goal created successfully", goal),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateGoalRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .goals
        .update(
            user.id,
            id,
            GoalUpdate {
                title: req.title,
                description: req.description,
                category: req.category,
                target_value: req.target_value,
                current_value: req.current_value,
                unit: req.unit,
                deadline: req.deadline,
                is_completed: req.is_completed,
                priority: req.priority,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Health goal not found"))?;
    Ok(response::message_data(
        "Health goal updated successfully",
        updated,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    if !state.goals.delete(user.id, id).await? {
        return Err(ApiError::not_found("Health goal not found"));
    }
    Ok(response::message("Health goal deleted successfully"))
}
