//! HTTP contract tests for the ModelScope client.
//!
//! A wiremock server stands in for the inference gateway so the tests can
//! check request shape (path, headers, body) and the mapping of responses
//! onto tasks and errors without network access or credentials.

use std::time::Duration;

use assert_matches::assert_matches;
use studio_core::error_category::ErrorCategory;
use studio_core::generation::{GenerationParams, TaskStatus};
use studio_gateway::api::{GatewayError, ModelScopeApi};
use studio_gateway::poller::{poll_until_terminal, PollConfig, PollError};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "ms-test-key";
const MODEL: &str = "test/model";

fn client(server: &MockServer) -> ModelScopeApi {
    ModelScopeApi::new(server.uri(), API_KEY, MODEL, Duration::from_secs(5)).unwrap()
}

fn status_body(status: &str) -> serde_json::Value {
    serde_json::json!({ "task_status": status, "output_images": null, "request_id": "r" })
}

// ---------------------------------------------------------------------------
// Task creation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_task_sends_async_request_and_returns_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(header("Authorization", "Bearer ms-test-key"))
        .and(header("X-ModelScope-Async-Mode", "true"))
        .and(body_partial_json(serde_json::json!({
            "model": MODEL,
            "prompt": "a red cat",
            "width": 1024,
            "height": 1024,
            "steps": 30,
            "guidance_scale": 7.5,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_id": "abc123",
            "task_status": "PROCESSING",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let task_id = client(&server)
        .create_task(&GenerationParams::new("a red cat"))
        .await
        .unwrap();
    assert_eq!(task_id, "abc123");
}

#[tokio::test]
async fn create_task_forwards_seed_model_and_loras() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .and(body_partial_json(serde_json::json!({
            "model": "other/model",
            "seed": 42,
            "loras": { "repo/style": 0.8 },
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "task_id": "t-9" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut params = GenerationParams::new("a red cat");
    params.model = Some("other/model".into());
    params.seed = Some(42);
    params.loras = Some([("repo/style".to_string(), 0.8)].into_iter().collect());

    let task_id = client(&server).create_task(&params).await.unwrap();
    assert_eq!(task_id, "t-9");
}

#[tokio::test]
async fn create_task_unauthorized_is_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = client(&server)
        .create_task(&GenerationParams::new("a red cat"))
        .await
        .unwrap_err();

    assert_matches!(err, GatewayError::Api { status: 401, ref body } if body == "invalid api key");
    assert_eq!(err.category(), ErrorCategory::Auth);
}

#[tokio::test]
async fn create_task_without_id_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/images/generations"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "task_id": "" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .create_task(&GenerationParams::new("a red cat"))
        .await
        .unwrap_err();
    assert_matches!(err, GatewayError::MissingTaskId);
}

// ---------------------------------------------------------------------------
// Status reads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn query_task_sends_task_type_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .and(header("Authorization", "Bearer ms-test-key"))
        .and(header("X-ModelScope-Task-Type", "image_generation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .expect(1)
        .mount(&server)
        .await;

    let task = client(&server).query_task("abc123").await.unwrap();
    assert_eq!(task.task_id, "abc123");
    assert_eq!(task.status, TaskStatus::Processing);
    assert!(task.output_url.is_none());
}

#[tokio::test]
async fn query_task_keeps_id_inside_its_path_segment() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/a%2Fb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .expect(1)
        .mount(&server)
        .await;

    let task = client(&server).query_task("a/b").await.unwrap();
    assert_eq!(task.task_id, "a/b");
}

#[tokio::test]
async fn succeeded_task_reads_are_idempotent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_status": "SUCCEED",
            "output_images": ["https://x/y.png"],
        })))
        .mount(&server)
        .await;

    let api = client(&server);
    let first = api.query_task("abc123").await.unwrap();
    let second = api.query_task("abc123").await.unwrap();

    assert_eq!(first.status, TaskStatus::Succeeded);
    assert_eq!(first.output_url.as_deref(), Some("https://x/y.png"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn failed_task_carries_gateway_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_status": "FAILED",
            "error_message": "prompt rejected",
        })))
        .mount(&server)
        .await;

    let task = client(&server).query_task("abc123").await.unwrap();
    assert_eq!(task.status, TaskStatus::Failed);
    assert_eq!(task.error_message.as_deref(), Some("prompt rejected"));
}

#[tokio::test]
async fn unrecognized_status_maps_to_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("QUEUED")))
        .mount(&server)
        .await;

    let task = client(&server).query_task("abc123").await.unwrap();
    assert_eq!(task.status, TaskStatus::Unknown);
}

#[tokio::test]
async fn server_error_on_status_read_is_server_category() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = client(&server).query_task("abc123").await.unwrap_err();
    assert_matches!(err, GatewayError::Api { status: 500, .. });
    assert_eq!(err.category(), ErrorCategory::Server);
}

// ---------------------------------------------------------------------------
// Polling against the HTTP client
// ---------------------------------------------------------------------------

#[tokio::test]
async fn poller_resolves_red_cat_scenario() {
    let server = MockServer::start().await;

    // The higher-priority PROCESSING mock answers the first two reads.
    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "task_status": "SUCCEED",
            "output_images": ["https://x/y.png"],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let task = poll_until_terminal(
        &api,
        "abc123",
        &PollConfig::fixed(Duration::from_millis(5), 60),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(task.status, TaskStatus::Succeeded);
    assert_eq!(task.output_url.as_deref(), Some("https://x/y.png"));

    let reads = server.received_requests().await.unwrap().len();
    assert_eq!(reads, 3);
}

#[tokio::test]
async fn poller_times_out_after_budget_of_http_reads() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tasks/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(status_body("PROCESSING")))
        .expect(60)
        .mount(&server)
        .await;

    let api = client(&server);
    let err = poll_until_terminal(
        &api,
        "abc123",
        &PollConfig::fixed(Duration::from_millis(1), 60),
        &CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert_matches!(err, PollError::Timeout { attempts: 60, .. });
}
