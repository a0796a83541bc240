pub mod auth_routes;
pub mod goals;
pub mod insights;
pub mod medications;
pub mod metrics;
pub mod middleware;
pub mod profile;
pub mod reminders;
pub mod response;
pub mod symptoms;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::ai::InsightService;
use crate::auth::TokenService;
use crate::config::Config;
use crate::db::Db;
use crate::error::{CareTrackError, Result};
use crate::interfaces::providers::LlmProvider;
use crate::notify::sweeps::{
    AlertDispatcher, DailyAlertJob, MedicationReminderJob, ReminderSweepJob,
};
use crate::notify::{EmailSender, NoopMailer, SmtpMailer};
use crate::providers::openai::OpenAiProvider;
use crate::scheduler::Scheduler;
use crate::stores::ai_usage::AiUsageStore;
use crate::stores::goals::GoalStore;
use crate::stores::medications::MedicationStore;
use crate::stores::metrics::MetricStore;
use crate::stores::reminders::ReminderStore;
use crate::stores::symptoms::SymptomStore;
use crate::stores::users::UserStore;

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub medications: MedicationStore,
    pub symptoms: SymptomStore,
    pub goals: GoalStore,
    pub reminders: ReminderStore,
    pub metrics: MetricStore,
    pub tokens: TokenService,
    pub insights: InsightService,
    pub dispatcher: AlertDispatcher,
}

pub fn build_router(state: AppState, cors_origin: &str) -> Router {
    let cors = match cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::permissive(),
    };

    let protected = Router::new()
        .route(
            "/api/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/auth/profile",
            get(profile::get_profile).put(profile::update_profile),
        )
        .route(
            "/api/preferences",
            get(profile::get_preferences).put(profile::update_preferences),
        )
        .route(
            "/api/medications",
            get(medications::list).post(medications::create),
        )
        .route(
            "/api/medications/:id",
            axum::routing::put(medications::update).delete(medications::delete),
        )
        .route("/api/symptoms", get(symptoms::list).post(symptoms::create))
        .route("/api/goals", get(goals::list).post(goals::create))
        .route(
            "/api/goals/:id",
            axum::routing::put(goals::update).delete(goals::delete),
        )
        .route(
            "/api/reminders",
            get(reminders::list).post(reminders::create),
        )
        .route(
            "/api/reminders/:id",
            axum::routing::put(reminders::update).delete(reminders::delete),
        )
        .route(
            "/api/health-metrics",
            get(metrics::list).post(metrics::create),
        )
        .route("/api/ai-insights", get(insights::ai_insights))
        .route("/api/send-test-alert", post(insights::send_test_alert))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    // Older clients used the unprefixed auth paths; both are served.
    Router::new()
        .route("/health", get(health))
        .route("/api/register", post(auth_routes::register))
        .route("/api/login", post(auth_routes::login))
        .route("/api/auth/register", post(auth_routes::register))
        .route("/api/auth/login", post(auth_routes::login))
        .merge(protected)
        .fallback(insights::not_found)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Builds the full application state from config: pool, stores, token
/// service, model provider, mailer, and the alert dispatcher.
pub async fn build_state(config: &Config) -> Result<AppState> {
    let db = Db::new(&config.database_path).await?;
    let users = UserStore::new(db.clone());
    let medications = MedicationStore::new(db.clone());
    let symptoms = SymptomStore::new(db.clone());
    let goals = GoalStore::new(db.clone());
    let reminders = ReminderStore::new(db.clone());
    let metrics = MetricStore::new(db.clone());
    let usage = AiUsageStore::new(db);

    let provider: Option<Arc<dyn LlmProvider>> = config.ai_api_key.clone().map(|key| {
        Arc::new(OpenAiProvider::new(
            key,
            Some(config.ai_model.clone()),
            Some(config.ai_base_url.clone()),
        )) as Arc<dyn LlmProvider>
    });
    if provider.is_some() {
        info!(model = %config.ai_model, base = %config.ai_base_url, "ai provider configured");
    } else {
        info!("ai provider not configured, serving fallback recommendations");
    }
    let insights = InsightService::new(provider, usage, config.ai_monthly_call_limit);

    let mailer: Arc<dyn EmailSender> = match &config.smtp_host {
        Some(host) => {
            let mailer = SmtpMailer::new(
                host,
                config.smtp_port,
                config.smtp_user.as_deref(),
                config.smtp_pass.as_deref(),
                &config.email_from,
            )?;
            mailer.verify().await;
            Arc::new(mailer)
        }
        None => {
            info!("smtp not configured, alert email disabled");
            Arc::new(NoopMailer)
        }
    };

    let dispatcher = AlertDispatcher {
        users: users.clone(),
        goals: goals.clone(),
        symptoms: symptoms.clone(),
        medications: medications.clone(),
        reminders: reminders.clone(),
        insights: insights.clone(),
        mailer,
    };

    Ok(AppState {
        users,
        medications,
        symptoms,
        goals,
        reminders,
        metrics,
        tokens: TokenService::new(config.jwt_secret.clone(), config.jwt_expiry_seconds),
        insights,
        dispatcher,
    })
}

pub async fn run(config: Config) -> Result<()> {
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    run_with_shutdown(config, shutdown).await
}

pub async fn run_with_shutdown<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = build_state(&config).await?;

    let mut scheduler = Scheduler::new();
    scheduler.register_job(Arc::new(DailyAlertJob {
        dispatcher: state.dispatcher.clone(),
        interval: Duration::from_secs(config.daily_alert_interval_secs.max(1)),
    }));
    scheduler.register_job(Arc::new(MedicationReminderJob {
        dispatcher: state.dispatcher.clone(),
        interval: Duration::from_secs(config.medication_sweep_interval_secs.max(1)),
    }));
    scheduler.register_job(Arc::new(ReminderSweepJob {
        dispatcher: state.dispatcher.clone(),
        interval: Duration::from_secs(config.reminder_sweep_interval_secs.max(1)),
    }));
    scheduler.start();
    info!(
        daily_secs = config.daily_alert_interval_secs,
        medication_secs = config.medication_sweep_interval_secs,
        reminder_secs = config.reminder_sweep_interval_secs,
        "notification sweeps scheduled"
    );

    let app = build_router(state, &config.cors_origin);
    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
    info!(addr = %config.listen, "server listening");

    let shutdown = async move {
        shutdown.await;
        scheduler.stop();
    };
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| CareTrackError::Runtime(e.to_string()))?;
    Ok(())
}
