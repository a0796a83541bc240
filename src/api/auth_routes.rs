use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::api::response::{ApiError, ApiResult};
use crate::api::AppState;
use crate::auth::{hash_password, verify_password};
use crate::stores::users::{NewUserInput, PreferenceSet, PreferenceUpdate, UserProfile, UserRecord};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub age: Option<i32>,
    pub condition: Option<String>,
    #[serde(default)]
    pub preferences: PreferenceUpdate,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

fn session_payload(token: String, user: &UserRecord, prefs: &PreferenceSet) -> serde_json::Value {
    json!({
        "token": token,
        "user": {
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "age": user.age,
            "condition": user.condition,
            "preferences": prefs,
        },
    })
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(name), Some(email), Some(password), Some(condition)) =
        (req.name, req.email, req.password, req.condition)
    else {
        return Err(ApiError::bad_request(
            "All required fields must be provided",
        ));
    };
    if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::bad_request(
            "All required fields must be provided",
        ));
    }

    let password_hash = hash_password(&password)?;
    let (user, prefs) = state
        .users
        .create_user(
            NewUserInput {
                name,
                email,
                password_hash,
                age: req.age,
                condition,
            },
            req.preferences,
        )
        .await?;

    let token = state.tokens.issue(user.id)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "User registered successfully",
            "data": session_payload(token, &user, &prefs),
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };

    // Same response for an unknown address and a wrong password.
    let invalid = || ApiError::new(StatusCode::UNAUTHORIZED, "Invalid email or password");
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&password, &user.password_hash)? {
        return Err(invalid());
    }

    let prefs = state.users.preferences(user.id).await?;
    let token = state.tokens.issue(user.id)?;
    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "data": session_payload(token, &user, &prefs),
    })))
}

pub fn profile_payload(user: &UserRecord, prefs: &PreferenceSet) -> serde_json::Value {
    let mut profile = serde_json::to_value(UserProfile::from(user)).unwrap_or_default();
    if let Some(obj) = profile.as_object_mut() {
        obj.insert(
            "preferences".to_string(),
            serde_json::to_value(prefs).unwrap_or_default(),
        );
    }
    json!({ "user": profile })
}
