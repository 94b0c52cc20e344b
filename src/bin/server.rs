use gitagent::api::{self, AppState, EnvAnalysisRunner};
use gitagent::config::ApiKeys;
use gitagent::{Config, ResultStore};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("GITAGENT_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let config = Arc::new(Config::load()?.with_env_overrides());
    config.validate()?;

    let keys = ApiKeys::from_env();
    if keys.webhook_secret.is_none() {
        warn!("GITHUB_WEBHOOK_SECRET is not set; webhook signatures will not be verified");
    }

    let state = AppState {
        store: ResultStore::new(config.server.concurrency_policy),
        config: config.clone(),
        runner: Arc::new(EnvAnalysisRunner::new(config.clone())),
        webhook_secret: keys.webhook_secret,
    };

    info!("gitagent web server starting...");
    info!("Model provider: {:?}", config.model.provider);
    info!("Tracked branches: {}", config.server.webhook_branches.join(", "));

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    info!("Server listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
