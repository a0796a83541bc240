use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::response::{self, ApiError, ApiResult};
use crate::api::AppState;
use crate::stores::metrics::NewMetricInput;
use crate::stores::users::UserRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMetricRequest {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
    pub is_critical: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub metric_type: Option<String>,
    pub limit: Option<i64>,
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<CreateMetricRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(metric_type), Some(value)) = (req.metric_type, req.value) else {
        return Err(ApiError::bad_request("Metric type and value are required"));
    };

    let metric = state
        .metrics
        .create(
            user.id,
            NewMetricInput {
                metric_type,
                value,
                unit: req.unit,
                notes: req.notes,
                is_critical: req.is_critical,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::message_data("Health metric recorded successfully", metric),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let metrics = state
        .metrics
        .list(
            user.id,
            query.metric_type.as_deref(),
            query.limit.unwrap_or(30),
        )
        .await?;
    Ok(response::data(metrics))
}
