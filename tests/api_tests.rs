use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use gitagent::api::{self, AppState};
use gitagent::cache::{AnalysisRecord, CommitInfo};
use gitagent::config::ConcurrencyPolicy;
use gitagent::{webhook, Config, ResultStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

mod common;
use common::CannedRunner;

const SECRET: &str = "test-webhook-secret";
const REPO: &str = "https://github.com/acme/widget";

fn app(runner: Arc<CannedRunner>) -> (Router, ResultStore) {
    let store = ResultStore::new(ConcurrencyPolicy::Serialized);
    let state = AppState {
        store: store.clone(),
        config: Arc::new(Config::default()),
        runner,
        webhook_secret: Some(SECRET.to_string()),
    };
    (api::router(state), store)
}

fn webhook_request(payload: &Value, signature: Option<String>) -> Request<Body> {
    let body = payload.to_string();
    let signature = signature.unwrap_or_else(|| webhook::sign(SECRET, body.as_bytes()).unwrap());
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .header(webhook::SIGNATURE_HEADER, signature)
        .body(Body::from(body))
        .unwrap()
}

fn push(branch: &str) -> Value {
    json!({
        "ref": format!("refs/heads/{}", branch),
        "repository": { "html_url": REPO },
        "head_commit": { "message": "Bump version", "author": { "name": "Robin" } }
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app(Arc::new(CannedRunner::reporting("ok")));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_signed_push_is_analyzed_and_stored() {
    let runner = Arc::new(CannedRunner::reporting("# Widget report"));
    let (app, store) = app(runner.clone());

    let response = app.clone().oneshot(webhook_request(&push("main"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Analysis completed successfully");
    assert_eq!(body["repository"], REPO);
    assert_eq!(body["commit_info"]["author"], "Robin");
    assert_eq!(body["commit_info"]["message"], "Bump version");
    assert_eq!(runner.calls(), 1);

    let stored = store.get(REPO).await.unwrap();
    assert_eq!(stored.result, "# Widget report");
    assert_eq!(stored.commit.unwrap().author, "Robin");

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/results/{}", REPO))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let record = body_json(response).await;
    assert_eq!(record["repository"], REPO);
    assert_eq!(record["result"], "# Widget report");
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let runner = Arc::new(CannedRunner::reporting("unused"));
    let (app, store) = app(runner.clone());

    let response = app
        .oneshot(webhook_request(&push("main"), Some("sha256=deadbeef".into())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(runner.calls(), 0);
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_untracked_branch_is_ignored() {
    let runner = Arc::new(CannedRunner::reporting("unused"));
    let (app, _) = app(runner.clone());

    let response = app.oneshot(webhook_request(&push("develop"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["message"], "Ignoring push to develop branch");
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_payload_without_repository_is_invalid() {
    let runner = Arc::new(CannedRunner::reporting("unused"));
    let (app, _) = app(runner.clone());

    let response = app
        .clone()
        .oneshot(webhook_request(&json!({ "zen": "Design for failure." }), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid webhook event");

    let body = "not json";
    let request = Request::builder()
        .method("POST")
        .uri("/webhook")
        .header(webhook::SIGNATURE_HEADER, webhook::sign(SECRET, body.as_bytes()).unwrap())
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(runner.calls(), 0);
}

#[tokio::test]
async fn test_failed_analysis_returns_server_error() {
    let (app, store) = app(Arc::new(CannedRunner::failing()));

    let response = app.oneshot(webhook_request(&push("master"), None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let message = body_json(response).await["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Error during analysis"));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_unknown_results_are_not_found() {
    let (app, _) = app(Arc::new(CannedRunner::reporting("unused")));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/results/https://github.com/nobody/nothing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "No analysis found for this repository");
}

#[tokio::test]
async fn test_form_submission_renders_report() {
    let runner = Arc::new(CannedRunner::reporting("## Findings\n\n- tidy <b>up</b>"));
    let (app, store) = app(runner.clone());

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("repo_url=https%3A%2F%2Fgithub.com%2Facme%2Fwidget"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Analysis completed successfully!"));
    assert!(page.contains("<h2>Findings</h2>"));
    assert!(!page.contains("<b>up</b>"));
    assert_eq!(store.len().await, 1);

    let request = Request::builder()
        .method("POST")
        .uri("/analyze")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from("repo_url="))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.contains("Please provide a repository URL"));
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_index_lists_previous_analyses() {
    let (app, store) = app(Arc::new(CannedRunner::reporting("unused")));
    store
        .insert(AnalysisRecord::new(
            REPO,
            "Looks **good**",
            Some(CommitInfo { author: "Robin".into(), message: "Initial commit".into() }),
        ))
        .await;

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let page = body_text(response).await;
    assert!(page.contains("Previous analyses"));
    assert!(page.contains("Commit by Robin: Initial commit"));
    assert!(page.contains("<strong>good</strong>"));
}
