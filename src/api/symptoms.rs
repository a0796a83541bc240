use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::ai::SymptomSummary;
use crate::api::response::{self, ApiError, ApiResult};
use crate::api::AppState;
use crate::stores::symptoms::NewSymptomInput;
use crate::stores::users::UserRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSymptomRequest {
    #[serde(rename = "type")]
    pub symptom_type: Option<String>,
    pub severity: Option<i32>,
    pub description: Option<String>,
    pub duration: Option<String>,
    pub triggers: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

/// Recording a symptom also runs an analysis over the user's ten most
/// recent entries; risk level is always computed locally.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<CreateSymptomRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(symptom_type), Some(severity)) = (req.symptom_type, req.severity) else {
        return Err(ApiError::bad_request(
            "Symptom type and severity are required",
        ));
    };
    if !(1..=10).contains(&severity) {
        return Err(ApiError::bad_request("Severity must be between 1 and 10"));
    }

    let symptom = state
        .symptoms
        .create(
            user.id,
            NewSymptomInput {
                symptom_type,
                severity,
                description: req.description,
                duration: req.duration,
                triggers: req.triggers,
            },
        )
        .await?;

    let recent = state.symptoms.recent(user.id, 10).await?;
    let summaries: Vec<SymptomSummary> = recent
        .iter()
        .map(|s| SymptomSummary {
            symptom_type: s.symptom_type.clone(),
            severity: s.severity,
            recorded_at: s.recorded_at,
        })
        .collect();
    let analysis = state
        .insights
        .analyze_symptoms(&user.condition, &summaries)
        .await;

    Ok((
        StatusCode::CREATED,
        response::message_data(
            "Symptom recorded successfully",
            json!({ "symptom": symptom, "analysis": analysis }),
        ),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Query(query): Query<ListQuery>,
) -> ApiResult<impl IntoResponse> {
    let symptoms = state
        .symptoms
        .recent(user.id, query.limit.unwrap_or(20))
        .await?;
    Ok(response::data(symptoms))
}
