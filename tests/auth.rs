mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{harness, register_user, request};

#[tokio::test]
async fn register_returns_token_and_profile() {
    let h = harness().await;
    let (status, body) = request(
        &h.app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2hunter2",
            "age": 41,
            "condition": "Hypertension",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["message"], json!("User registered successfully"));
    assert!(body["data"]["token"].as_str().unwrap().len() > 20);
    assert_eq!(body["data"]["user"]["email"], json!("ada@example.com"));
    assert_eq!(
        body["data"]["user"]["preferences"]["dailyAlerts"],
        json!(true)
    );
}

#[tokio::test]
async fn register_rejects_missing_fields_and_duplicates() {
    let h = harness().await;
    let (status, body) = request(
        &h.app,
        "POST",
        "/api/register",
        None,
        Some(json!({ "email": "x@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));

    register_user(&h.app, "Ada", "ada@example.com", "Hypertension").await;
    let (status, body) = request(
        &h.app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": "Ada Again",
            "email": "ada@example.com",
            "password": "hunter2hunter2",
            "condition": "Hypertension",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], json!("User with this email already exists"));
}

#[tokio::test]
async fn login_is_generic_about_bad_credentials() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Hypertension").await;

    // Unknown address and wrong password must be indistinguishable.
    let (status, body) = request(
        &h.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "pw" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid email or password"));

    let (status, body) = request(
        &h.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Invalid email or password"));

    let (status, body) = request(
        &h.app,
        "POST",
        "/api/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Login successful"));
    assert!(body["data"]["token"].is_string());
}

#[tokio::test]
async fn auth_prefixed_paths_are_aliases() {
    let h = harness().await;
    let (status, body) = request(
        &h.app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "hunter2hunter2",
            "condition": "Hypertension",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, _) = request(
        &h.app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "ada@example.com", "password": "hunter2hunter2" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = request(&h.app, "GET", "/api/auth/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["name"], json!("Ada"));
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let h = harness().await;

    let (status, body) = request(&h.app, "GET", "/api/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], json!("Access token required"));

    let (status, body) = request(&h.app, "GET", "/api/profile", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], json!("Invalid or expired token"));
}

#[tokio::test]
async fn profile_read_and_merge_update() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Hypertension").await;

    let (status, body) = request(&h.app, "GET", "/api/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["name"], json!("Ada"));
    assert_eq!(body["data"]["user"]["condition"], json!("Hypertension"));

    // Absent fields keep their values.
    let (status, body) = request(
        &h.app,
        "PUT",
        "/api/profile",
        Some(&token),
        Some(json!({ "age": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["age"], json!(42));
    assert_eq!(body["data"]["user"]["name"], json!("Ada"));

    let (status, body) = request(
        &h.app,
        "PUT",
        "/api/preferences",
        Some(&token),
        Some(json!({ "dailyAlerts": false, "preferredEmailTime": "07:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["dailyAlerts"], json!(false));
    assert_eq!(body["data"]["preferredEmailTime"], json!("07:00"));
    assert_eq!(body["data"]["medicationReminders"], json!(true));
}
