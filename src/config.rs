//! Runtime configuration from CLI flags and environment variables.

use std::net::SocketAddr;

use clap::Parser;

use crate::error::{CareTrackError, Result};

#[derive(Parser, Debug, Clone)]
#[command(name = "caretrackd")]
#[command(about = "CareTrack health-management API server")]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:5000")]
    pub listen: SocketAddr,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "./data/caretrack.db")]
    pub database_path: String,

    /// Secret used to sign access tokens
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: String,

    /// Access-token lifetime in seconds (default 7 days)
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "604800")]
    pub jwt_expiry_seconds: u64,

    /// SMTP relay host; alert e-mail is disabled when unset
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    #[arg(long, env = "SMTP_PORT", default_value = "587")]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS")]
    pub smtp_pass: Option<String>,

    /// From address for outbound alerts
    #[arg(long, env = "EMAIL_FROM", default_value = "CareTrack <alerts@caretrack.local>")]
    pub email_from: String,

    /// API key for the chat-completion endpoint; fallback text is served when unset
    #[arg(long, env = "AI_API_KEY")]
    pub ai_api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[arg(long, env = "AI_BASE_URL", default_value = "https://api.deepseek.com/v1")]
    pub ai_base_url: String,

    #[arg(long, env = "AI_MODEL", default_value = "deepseek-chat")]
    pub ai_model: String,

    /// Monthly ceiling on outbound AI calls; at the ceiling the service
    /// short-circuits to fallback text
    #[arg(long, env = "AI_MONTHLY_CALL_LIMIT", default_value = "500")]
    pub ai_monthly_call_limit: i64,

    /// Daily-alert sweep interval in seconds (hourly tick)
    #[arg(long, env = "DAILY_ALERT_INTERVAL_SECS", default_value = "3600")]
    pub daily_alert_interval_secs: u64,

    /// Medication-reminder sweep interval in seconds
    #[arg(long, env = "MEDICATION_SWEEP_INTERVAL_SECS", default_value = "30")]
    pub medication_sweep_interval_secs: u64,

    /// General reminder sweep interval in seconds
    #[arg(long, env = "REMINDER_SWEEP_INTERVAL_SECS", default_value = "60")]
    pub reminder_sweep_interval_secs: u64,

    /// Allowed CORS origin for the SPA
    #[arg(long, env = "CORS_ORIGIN", default_value = "http://localhost:5173")]
    pub cors_origin: String,

    /// Log filter (tracing EnvFilter syntax)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < 32 {
            return Err(CareTrackError::Config(
                "JWT_SECRET must be at least 32 characters".to_string(),
            ));
        }
        Ok(())
    }
}
