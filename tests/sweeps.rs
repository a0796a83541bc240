mod common;

use std::sync::Arc;

use serde_json::json;
use tempfile::NamedTempFile;

use caretrack::ai::InsightService;
use caretrack::db::{now_ts, Db};
use caretrack::stores::ai_usage::AiUsageStore;
use caretrack::stores::medications::NewMedicationInput;
use caretrack::stores::reminders::NewReminderInput;
use caretrack::stores::users::PreferenceUpdate;

use common::{harness, register_user, request, StaticLlmProvider};

/// Covers the current and following minute so a rollover between setup and
/// the sweep cannot miss the match.
fn this_and_next_minute() -> Vec<String> {
    let now = chrono::Local::now();
    vec![
        now.format("%H:%M").to_string(),
        (now + chrono::Duration::minutes(1)).format("%H:%M").to_string(),
    ]
}

#[tokio::test]
async fn reminder_sweep_sends_once_and_marks_the_row() {
    let h = harness().await;
    let token = register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    h.state
        .reminders
        .create(
            user.id,
            NewReminderInput {
                reminder_type: "appointment".to_string(),
                title: "Checkup".to_string(),
                message: Some("See Dr. Smith".to_string()),
                scheduled_time: now_ts() - 60,
                is_recurring: None,
                recurrence_pattern: None,
                priority: None,
                send_email: Some(true),
            },
        )
        .await
        .unwrap();

    h.state.dispatcher.run_reminder_sweep().await.unwrap();
    h.state.dispatcher.run_reminder_sweep().await.unwrap();

    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1, "sweep re-run must be a no-op");
    assert_eq!(sent[0].to, "ada@example.com");
    assert_eq!(sent[0].subject, "Reminder: Checkup");

    let (_, body) = request(&h.app, "GET", "/api/reminders", Some(&token), None).await;
    assert_eq!(body["data"][0]["emailSent"], json!(true));
}

#[tokio::test]
async fn reminder_sweep_is_not_gated_by_preference_toggles() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    h.state
        .users
        .update_preferences(
            user.id,
            PreferenceUpdate {
                appointment_reminders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // A water reminder with send_email on still goes out; the appointment
    // toggle only affects what the client surfaces, not this sweep.
    h.state
        .reminders
        .create(
            user.id,
            NewReminderInput {
                reminder_type: "water".to_string(),
                title: "Drink water".to_string(),
                message: None,
                scheduled_time: now_ts() - 60,
                is_recurring: None,
                recurrence_pattern: None,
                priority: None,
                send_email: Some(true),
            },
        )
        .await
        .unwrap();

    h.state.dispatcher.run_reminder_sweep().await.unwrap();
    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Reminder: Drink water");
}

#[tokio::test]
async fn medication_sweep_fires_on_every_matching_tick() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    h.state
        .medications
        .create(
            user.id,
            NewMedicationInput {
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "daily".to_string(),
                times: this_and_next_minute(),
                instructions: None,
                send_reminders: Some(true),
            },
        )
        .await
        .unwrap();

    h.state.dispatcher.run_medication_sweep().await.unwrap();
    h.state.dispatcher.run_medication_sweep().await.unwrap();

    // No sent marker on medication reminders; each matching tick sends.
    let sent = h.mailer.sent().await;
    assert_eq!(sent.len(), 2);
    assert!(sent[0].subject.contains("Metformin"));
}

#[tokio::test]
async fn medication_sweep_respects_opt_outs() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    h.state
        .users
        .update_preferences(
            user.id,
            PreferenceUpdate {
                medication_reminders: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    h.state
        .medications
        .create(
            user.id,
            NewMedicationInput {
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "daily".to_string(),
                times: this_and_next_minute(),
                instructions: None,
                send_reminders: Some(true),
            },
        )
        .await
        .unwrap();

    h.state.dispatcher.run_medication_sweep().await.unwrap();
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn daily_alert_records_last_sent_time() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.last_alert_sent.is_none());

    h.state
        .dispatcher
        .send_daily_alert_to_user(&user)
        .await
        .unwrap();

    let user = h.state.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(user.last_alert_sent.is_some());
    assert_eq!(h.mailer.sent().await.len(), 1);
}

#[tokio::test]
async fn daily_sweep_skips_users_outside_their_preferred_hour() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    // Pick an hour that is never the current one.
    use chrono::Timelike;
    let other_hour = (chrono::Local::now().hour() + 2) % 24;
    h.state
        .users
        .update_preferences(
            user.id,
            PreferenceUpdate {
                preferred_email_time: Some(format!("{other_hour:02}:00")),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    h.state.dispatcher.run_daily_sweep().await.unwrap();
    assert!(h.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn deleting_a_user_cascades_to_their_rows() {
    let h = harness().await;
    register_user(&h.app, "Ada", "ada@example.com", "Diabetes").await;
    let user = h
        .state
        .users
        .find_by_email("ada@example.com")
        .await
        .unwrap()
        .unwrap();

    h.state
        .medications
        .create(
            user.id,
            NewMedicationInput {
                name: "Metformin".to_string(),
                dosage: "500mg".to_string(),
                frequency: "daily".to_string(),
                times: vec!["08:00".to_string()],
                instructions: None,
                send_reminders: None,
            },
        )
        .await
        .unwrap();

    assert!(h.state.users.delete_user(user.id).await.unwrap());
    assert!(h
        .state
        .medications
        .list(user.id)
        .await
        .unwrap()
        .is_empty());
    assert!(h.state.users.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
async fn monthly_ceiling_short_circuits_to_fallback() {
    let db_file = NamedTempFile::new().unwrap();
    let db = Db::new(db_file.path().to_str().unwrap()).await.unwrap();
    let usage = AiUsageStore::new(db.clone());

    assert!(usage.try_consume("2026-08", 1).await.unwrap());
    assert!(!usage.try_consume("2026-08", 1).await.unwrap());
    assert_eq!(usage.calls_this_month("2026-08").await.unwrap(), 1);

    // Ceiling of zero means the provider is never called.
    let insights = InsightService::new(
        Some(Arc::new(StaticLlmProvider::new("model text"))),
        usage,
        0,
    );
    let patient = caretrack::ai::PatientContext {
        name: "Ada".to_string(),
        age: None,
        condition: "Diabetes".to_string(),
        created_at: now_ts(),
    };
    let snapshot = caretrack::ai::HealthSnapshot {
        adherence_rate: 90.0,
        condition: "Diabetes".to_string(),
        ..Default::default()
    };
    let text = insights.generate_recommendation(&patient, &snapshot).await;
    assert!(text.starts_with("Excellent work!"), "got: {text}");
}
