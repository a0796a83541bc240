use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::response::{self, ApiError, ApiResult};
use crate::api::AppState;
use crate::stores::medications::{MedicationUpdate, NewMedicationInput};
use crate::stores::users::UserRecord;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub times: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub send_reminders: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMedicationRequest {
    pub name: Option<String>,
    pub dosage: Option<String>,
    pub frequency: Option<String>,
    pub times: Option<Vec<String>>,
    pub instructions: Option<String>,
    pub is_active: Option<bool>,
    pub send_reminders: Option<bool>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<impl IntoResponse> {
    let medications = state.medications.list(user.id).await?;
    Ok(response::data(medications))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<CreateMedicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(name), Some(dosage), Some(frequency), Some(times)) =
        (req.name, req.dosage, req.frequency, req.times)
    else {
        return Err(ApiError::bad_request(
            "All required medication fields must be provided",
        ));
    };

    let medication = state
        .medications
        .create(
            user.id,
            NewMedicationInput {
                name,
                dosage,
                frequency,
                times,
                instructions: req.instructions,
                send_reminders: req.send_reminders,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        response::message_data("Medication added successfully", medication),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateMedicationRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .medications
        .update(
            user.id,
            id,
            MedicationUpdate {
                name: req.name,
                dosage: req.dosage,
                frequency: req.frequency,
                times: req.times,
                instructions: req.instructions,
                is_active: req.is_active,
                send_reminders: req.send_reminders,
            },
        )
        .await?
        .ok_or_else(|| ApiError::not_found("Medication not found"))?;
    Ok(response::message_data(
        "Medication updated successfully",
        updated,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Path(id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    if !state.medications.delete(user.id, id).await? {
        return Err(ApiError::not_found("Medication not found"));
    }
    Ok(response::message("Medication deleted successfully"))
}
