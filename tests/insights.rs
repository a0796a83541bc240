mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{harness, harness_without_provider, register_user, request};

#[tokio::test]
async fn insights_include_recommendation_and_health_data() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    request(
        &h.app,
        "POST",
        "/api/medications",
        Some(&token),
        Some(json!({
            "name": "Metformin",
            "dosage": "500mg",
            "frequency": "daily",
            "times": ["08:00"],
        })),
    )
    .await;
    request(
        &h.app,
        "POST",
        "/api/symptoms",
        Some(&token),
        Some(json!({ "type": "Headache", "severity": 3 })),
    )
    .await;
    request(
        &h.app,
        "POST",
        "/api/goals",
        Some(&token),
        Some(json!({ "title": "Walk", "category": "exercise", "targetValue": 10.0 })),
    )
    .await;

    let (status, body) = request(&h.app, "GET", "/api/ai-insights", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["aiInsights"], json!("mock recommendation"));
    assert_eq!(body["data"]["source"], json!("deepseek-ai"));

    let health = &body["data"]["healthData"];
    assert_eq!(health["medicationsCount"], json!(1));
    assert_eq!(health["recentSymptomsCount"], json!(1));
    assert_eq!(health["totalGoals"], json!(1));
    assert_eq!(health["completedGoals"], json!(0));
    assert_eq!(health["adherenceRate"], json!(0.0));
    assert_eq!(health["medications"][0]["name"], json!("Metformin"));
    assert_eq!(health["recentSymptoms"][0]["type"], json!("Headache"));
    assert!(body["data"]["generatedAt"].is_string());
}

#[tokio::test]
async fn insights_fall_back_without_a_credential() {
    let h = harness_without_provider().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let (status, body) = request(&h.app, "GET", "/api/ai-insights", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["source"], json!("fallback-system"));
    // No goals at all puts the user in the lowest adherence bucket.
    let text = body["data"]["aiInsights"].as_str().unwrap();
    assert!(text.starts_with("We understand managing"), "got: {text}");
}

#[tokio::test]
async fn send_test_alert_delivers_to_the_caller() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let (status, body) = request(&h.app, "POST", "/api/send-test-alert", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        json!("Test alert sent successfully to your email")
    );

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "ada@example.com");
    assert!(sent[0].subject.starts_with("Your Daily Health Update"));
    assert!(sent[0].body.contains("Good Morning, Ada!"));
    assert!(sent[0].body.contains("mock recommendation"));
}

#[tokio::test]
async fn unknown_routes_get_the_envelope_404() {
    let h = harness().await;
    let (status, body) = request(&h.app, "GET", "/api/bogus", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["message"], json!("API endpoint not found"));
}
