use axum::extract::{Request, State};
use axum::http::{header::AUTHORIZATION, StatusCode};
use axum::middleware::Next;
use axum::response::Response;

use crate::api::response::ApiError;
use crate::api::AppState;

/// Bearer-token gate for every route behind `/api` except register and
/// login. The authenticated `UserRecord` is attached as a request extension.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    let Some(token) = token else {
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Access token required",
        ));
    };

    let user_id = state
        .tokens
        .verify(&token)
        .map_err(|_| ApiError::new(StatusCode::FORBIDDEN, "Invalid or expired token"))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::new(StatusCode::FORBIDDEN, "User not found"))?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
