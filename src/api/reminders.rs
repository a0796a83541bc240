use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::response::{self, ApiError, ApiResult};
use crate::api::AppState;
use crate::db::now_ts;
use crate::stores::reminders::{NewReminderInput, ReminderUpdate};
use crate::stores::users::UserRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReminderRequest {
    #[serde(rename = "type")]
    pub reminder_type: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub scheduled_time: Option<i64>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<String>,
    pub priority: Option<String>,
    pub send_email: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReminderRequest {
    pub title: Option<String>,
    pub message: Option<String>,
    pub scheduled_time: Option<i64>,
    pub is_completed: Option<bool>,
    pub priority: Option<String>,
    pub send_email: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub upcoming: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let mut reminders = state.reminders.list(user.id).await?;
    // Query parameters arrive as strings.
    if query.upcoming.as_deref() == Some("true") {
        let now = now_ts();
        reminders.retain(|r| r.scheduled_time >= now);
    }
    Ok(response::data(reminders))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<CreateReminderRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(reminder_type), Some(title), Some(message), Some(scheduled_time)) = (
        req.reminder_type,
        req.title,
        req.message,
        req.scheduled_time,
    ) else {
        return Err(ApiError::bad_request(
            "All required reminder fields must be provided",
        ));
    };

    let reminder = state
        .reminders
        .create(
            user.id,
            NewReminderInput {
                reminder_type,
                title,
                message: Some(message),
                scheduled_time,
                is_recurring: req.is_recurring,
                recurrence_pattern: req.recurrence_pattern,
                priority: req.priority,
                send_email: req.send_email,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::message_data("Reminder created successfully", reminder),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateReminderRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .reminders
        .update(
            user.id,
            id,
            ReminderUpdate {
                title: req.title,
                message: req.message,
                scheduled_time: req.scheduled_time,
                is_completed: req.is_completed,
                priority: req.priority,
                send_email: req.send_email,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Reminder not found"))?;
    Ok(response::message_data(
        "Reminder updated successfully",
        updated,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    if !state.reminders.delete(user.id, id).await? {
        return Err(ApiError::not_found("Reminder not found"));
    }
    Ok(response::message("Reminder deleted successfully"))
}
