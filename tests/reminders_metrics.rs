mod common;

use axum::http::StatusCode;
use serde_json::json;

use caretrack::db::now_ts;
use common::{harness, register_user, request};

#[tokio::test]
async fn reminder_create_validates_and_lists_soonest_first() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let (status, body) = request(
        &h.app,
        "POST",
        "/api/reminders",
        Some(&token),
        Some(json!({ "title": "Checkup" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        json!("All required reminder fields must be provided")
    );

    let now = now_ts();
    for (title, offset) in [("Later", 7200), ("Sooner", 3600)] {
        let (status, _) = request(
            &h.app,
            "POST",
            "/api/reminders",
            Some(&token),
            Some(json!({
                "type": "appointment",
                "title": title,
                "message": "See Dr. Smith",
                "scheduledTime": now + offset,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = request(&h.app, "GET", "/api/reminders", Some(&token), None).await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items[0]["title"], json!("Sooner"));
    assert_eq!(items[1]["title"], json!("Later"));
}

#[tokio::test]
async fn upcoming_filter_hides_past_reminders() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let now = now_ts();
    for (title, time) in [("Past", now - 3600), ("Future", now + 3600)] {
        request(
            &h.app,
            "POST",
            "/api/reminders",
            Some(&token),
            Some(json!({
                "type": "medication",
                "title": title,
                "message": "m",
                "scheduledTime": time,
            })),
        )
        .await;
    }

    let (_, body) = request(
        &h.app,
        "GET",
        "/api/reminders?upcoming=true",
        Some(&token),
        None,
    )
    .await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], json!("Future"));
}

#[tokio::test]
async fn reminder_update_marks_completed() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let (_, body) = request(
        &h.app,
        "POST",
        "/api/reminders",
        Some(&token),
        Some(json!({
            "type": "appointment",
            "title": "Checkup",
            "message": "m",
            "scheduledTime": now_ts() + 60,
        })),
    )
    .await;
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = request(
        &h.app,
        "PUT",
        &format!("/api/reminders/{id}"),
        Some(&token),
        Some(json!({ "isCompleted": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["isCompleted"], json!(true));
}

#[tokio::test]
async fn metric_create_and_filtered_list() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;

    let (status, body) = request(
        &h.app,
        "POST",
        "/api/health-metrics",
        Some(&token),
        Some(json!({ "type": "glucose" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("Metric type and value are required"));

    for (metric_type, value) in [("glucose", 5.8), ("weight", 82.0), ("glucose", 6.1)] {
        let (status, _) = request(
            &h.app,
            "POST",
            "/api/health-metrics",
            Some(&token),
            Some(json!({ "type": metric_type, "value": value, "unit": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = request(
        &h.app,
        "GET",
        "/api/health-metrics?type=glucose",
        Some(&token),
        None,
    )
    .await;
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|m| m["type"] == json!("glucose")));
    // Most recent first.
    assert_eq!(items[0]["value"], json!(6.1));
}
