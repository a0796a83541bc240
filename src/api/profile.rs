use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::auth_routes::profile_payload;
use crate::api::response::{self, ApiResult};
use crate::api::AppState;
use crate::stores::users::{PreferenceUpdate, ProfileUpdate, UserRecord};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub condition: Option<String>,
    pub preferences: Option<PreferenceUpdate>,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<impl IntoResponse> {
    let prefs = state.users.preferences(user.id).await?;
    Ok(response::data(profile_payload(&user, &prefs)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(req): Json<ProfileUpdateRequest>,
) -> ApiResult<impl IntoResponse> {
    let updated = state
        .users
        .update_profile(
            user.id,
            ProfileUpdate {
                name: req.name,
                age: req.age,
                condition: req.condition,
            },
        )
        .await?;
    let prefs = match req.preferences {
        Some(update) => state.users.update_preferences(user.id, update).await?,
        None => state.users.preferences(user.id).await?,
    };
    Ok(response::message_data(
        "Profile updated successfully",
        profile_payload(&updated, &prefs),
    ))
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
) -> ApiResult<impl IntoResponse> {
    let prefs = state.users.preferences(user.id).await?;
    Ok(response::data(prefs))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(user): Extension<UserRecord>,
    Json(update): Json<PreferenceUpdate>,
) -> ApiResult<impl IntoResponse> {
    let prefs = state.users.update_preferences(user.id, update).await?;
    Ok(response::message_data(
        "Preferences updated successfully",
        prefs,
    ))
}
