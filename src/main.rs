use clap::Parser;
use tracing_subscriber::EnvFilter;

use caretrack::api;
use caretrack::error::Result;
use caretrack::Config;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},caretrack=info", config.log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    config.validate()?;
    api::run(config).await
}
