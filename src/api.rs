//! Web front end and webhook receiver.

use crate::analyzer::{analyze_repository_with_config, AnalysisOutcome};
use crate::cache::{AnalysisRecord, CommitInfo, ResultStore};
use crate::config::Config;
use crate::error::{AnalysisError, Result};
use crate::render::{self, Flash};
use crate::webhook::{self, PushEvent, WebhookAction};
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{Form, Path, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Something that can turn a repository URL into an outcome
///
/// The server uses [`EnvAnalysisRunner`]; tests plug in canned runners.
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    /// Analyzes the repository at `repo_url`
    async fn run(&self, repo_url: &str) -> Result<AnalysisOutcome>;
}

/// Runs the real pipeline, reading secrets from the environment per call
pub struct EnvAnalysisRunner {
    config: Arc<Config>,
}

impl EnvAnalysisRunner {
    /// Creates a runner using `config` for limits and model selection
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AnalysisRunner for EnvAnalysisRunner {
    async fn run(&self, repo_url: &str) -> Result<AnalysisOutcome> {
        analyze_repository_with_config(repo_url, None, &self.config).await
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Stored analyses
    pub store: ResultStore,
    /// Server configuration
    pub config: Arc<Config>,
    /// Pipeline entry point
    pub runner: Arc<dyn AnalysisRunner>,
    /// Shared secret for webhook signatures; verification is skipped when absent
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    #[serde(default)]
    repo_url: String,
}

/// Builds the router with all routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/analyze", post(analyze))
        .route("/webhook", post(receive_webhook))
        .route("/api/results/*repo_url", get(get_results))
        .route("/health", get(health_check))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs an analysis for `repo_url` under the store policy and records it
pub async fn run_and_store(state: &AppState, repo_url: &str, commit: Option<CommitInfo>) -> Result<AnalysisRecord> {
    state
        .store
        .run_exclusive(repo_url, || async {
            let outcome = state.runner.run(repo_url).await?;
            let record = AnalysisRecord::new(repo_url, outcome.to_string(), commit);
            Ok::<_, AnalysisError>(state.store.insert(record).await)
        })
        .await
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let records = state.store.list().await;
    Html(render::render_index(&records, None, None))
}

async fn analyze(State(state): State<AppState>, Form(form): Form<AnalyzeForm>) -> Response {
    let repo_url = form.repo_url.trim();
    if repo_url.is_empty() {
        let records = state.store.list().await;
        let page = render::render_index(&records, None, Some(&Flash::error("Please provide a repository URL")));
        return (StatusCode::BAD_REQUEST, Html(page)).into_response();
    }

    info!("Analysis requested for {}", repo_url);
    match run_and_store(&state, repo_url, None).await {
        Ok(record) => {
            let records = state.store.list().await;
            let page = render::render_index(
                &records,
                Some((repo_url, record.result.as_str())),
                Some(&Flash::success("Analysis completed successfully!")),
            );
            Html(page).into_response()
        }
        Err(e) => {
            warn!("Analysis of {} failed: {}", repo_url, e);
            let status = match e {
                AnalysisError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let records = state.store.list().await;
            let page = render::render_index(
                &records,
                None,
                Some(&Flash::error(format!("Error during analysis: {}", e))),
            );
            (status, Html(page)).into_response()
        }
    }
}

async fn receive_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let signature = headers
        .get(webhook::SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !webhook::verify_signature(state.webhook_secret.as_deref(), &body, signature) {
        warn!("Invalid webhook signature, rejecting request");
        return (StatusCode::FORBIDDEN, Json(json!({ "message": "Invalid signature" }))).into_response();
    }

    let event = match PushEvent::from_payload(&body) {
        Ok(event) => event,
        Err(e) => {
            warn!("{}", e);
            return invalid_event();
        }
    };

    match event.action(&state.config.server.webhook_branches) {
        WebhookAction::Invalid => invalid_event(),
        WebhookAction::IgnoreBranch(branch) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Ignoring push to {} branch", branch) })),
        )
            .into_response(),
        WebhookAction::Analyze { repo_url, commit } => {
            info!("Change detected in repository: {}", repo_url);
            match run_and_store(&state, &repo_url, commit.clone()).await {
                Ok(record) => {
                    let mut response = json!({
                        "message": "Analysis completed successfully",
                        "repository": record.repository,
                        "timestamp": record.timestamp,
                    });
                    if let Some(commit) = commit {
                        response["commit_info"] = json!({
                            "author": commit.author,
                            "message": commit.message,
                        });
                    }
                    (StatusCode::OK, Json(response)).into_response()
                }
                Err(e) => {
                    error!("Error during analysis of {}: {}", repo_url, e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "message": format!("Error during analysis: {}", e) })),
                    )
                        .into_response()
                }
            }
        }
    }
}

fn invalid_event() -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": "Invalid webhook event" }))).into_response()
}

async fn get_results(State(state): State<AppState>, Path(repo_url): Path<String>) -> Response {
    match state.store.get(&repo_url).await {
        Some(record) => Json(record).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "No analysis found for this repository" })),
        )
            .into_response(),
    }
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "gitagent",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
