#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tower::ServiceExt;

use caretrack::ai::InsightService;
use caretrack::api::{build_router, AppState};
use caretrack::auth::TokenService;
use caretrack::db::Db;
use caretrack::error::{CareTrackError, Result};
use caretrack::interfaces::providers::LlmProvider;
use caretrack::notify::sweeps::AlertDispatcher;
use caretrack::notify::EmailSender;
use caretrack::stores::ai_usage::AiUsageStore;
use caretrack::stores::goals::GoalStore;
use caretrack::stores::medications::MedicationStore;
use caretrack::stores::metrics::MetricStore;
use caretrack::stores::reminders::ReminderStore;
use caretrack::stores::symptoms::SymptomStore;
use caretrack::stores::users::UserStore;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Always answers with the same text.
pub struct StaticLlmProvider {
    pub text: String,
}

impl StaticLlmProvider {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

#[async_trait]
impl LlmProvider for StaticLlmProvider {
    async fn generate_text(&self, _prompt: &str, _system_prompt: &str) -> Result<String> {
        Ok(self.text.clone())
    }
}

/// Fails every call, for exercising fallback paths.
pub struct FailingLlmProvider;

#[async_trait]
impl LlmProvider for FailingLlmProvider {
    async fn generate_text(&self, _prompt: &str, _system_prompt: &str) -> Result<String> {
        Err(CareTrackError::ExternalService("boom".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Records outbound mail instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentEmail>>,
}

impl RecordingMailer {
    pub async fn sent(&self) -> Vec<SentEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl EmailSender for RecordingMailer {
    async fn send_html(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
        self.sent.lock().await.push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: html_body.to_string(),
        });
        Ok(())
    }
}

pub struct TestHarness {
    pub app: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    _db_file: NamedTempFile,
}

pub async fn harness() -> TestHarness {
    harness_with_provider(Some(Arc::new(StaticLlmProvider::new("mock recommendation")))).await
}

pub async fn harness_without_provider() -> TestHarness {
    harness_with_provider(None).await
}

pub async fn harness_with_provider(provider: Option<Arc<dyn LlmProvider>>) -> TestHarness {
    let db_file = NamedTempFile::new().unwrap();
    let db = Db::new(db_file.path().to_str().unwrap()).await.unwrap();

    let users = UserStore::new(db.clone());
    let medications = MedicationStore::new(db.clone());
    let symptoms = SymptomStore::new(db.clone());
    let goals = GoalStore::new(db.clone());
    let reminders = ReminderStore::new(db.clone());
    let metrics = MetricStore::new(db.clone());
    let usage = AiUsageStore::new(db);

    let insights = InsightService::new(provider, usage, 500);
    let mailer = Arc::new(RecordingMailer::default());
    let dispatcher = AlertDispatcher {
        users: users.clone(),
        goals: goals.clone(),
        symptoms: symptoms.clone(),
        medications: medications.clone(),
        reminders: reminders.clone(),
        insights: insights.clone(),
        mailer: mailer.clone(),
    };

    let state = AppState {
        users,
        medications,
        symptoms,
        goals,
        reminders,
        metrics,
        tokens: TokenService::new(TEST_SECRET, 3600),
        insights,
        dispatcher,
    };
    let app = build_router(state.clone(), "http://localhost:5173");

    TestHarness {
        app,
        state,
        mailer,
        _db_file: db_file,
    }
}

pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Registers a user and returns their bearer token.
pub async fn register_user(app: &Router, name: &str, email: &str, condition: &str) -> String {
    let (status, body) = request(
        app,
        "POST",
        "/api/register",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": "hunter2hunter2",
            "age": 40,
            "condition": condition,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    body["data"]["token"].as_str().unwrap().to_string()
}
