//! HTTP health probe and task API client against a mock server.

use assert_matches::assert_matches;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use studymate::client::{
    Config, ConnectionMonitor, HealthProbe, HttpHealthProbe, HttpTaskRemote, LocalFallbackStore,
    MemoryBackend, MonitorConfig, TaskRemote,
};
use studymate::shared::{AppConfig, ProbeError, Task};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn health_server(template: ResponseTemplate) -> MockServer {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(template)
        .mount(&mock_server)
        .await;
    mock_server
}

fn probe_for(server: &MockServer, timeout: Duration) -> HttpHealthProbe {
    HttpHealthProbe::new(format!("{}/api/health", server.uri()), timeout).unwrap()
}

#[tokio::test]
async fn test_ok_status_is_healthy() {
    let server = health_server(
        ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "timestamp": "2024-01-01T00:00:00Z"})),
    )
    .await;

    let result = probe_for(&server, Duration::from_secs(5)).probe().await;
    assert!(result.is_ok(), "Probe should succeed: {:?}", result.err());
}

#[tokio::test]
async fn test_other_status_is_unhealthy() {
    let server = health_server(ResponseTemplate::new(200).set_body_json(json!({"status": "degraded"}))).await;

    let result = probe_for(&server, Duration::from_secs(5)).probe().await;
    assert_matches!(result, Err(ProbeError::Unhealthy { status }) if status == "degraded");
}

#[tokio::test]
async fn test_server_error_is_failure() {
    let server = health_server(ResponseTemplate::new(500)).await;

    let result = probe_for(&server, Duration::from_secs(5)).probe().await;
    assert_matches!(result, Err(ProbeError::HttpStatus { status: 500 }));
}

#[tokio::test]
async fn test_malformed_body_is_failure() {
    let server = health_server(ResponseTemplate::new(200).set_body_string("not valid json")).await;

    let result = probe_for(&server, Duration::from_secs(5)).probe().await;
    assert_matches!(result, Err(ProbeError::InvalidBody { .. }));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = health_server(
        ResponseTemplate::new(200)
            .set_body_json(json!({"status": "ok"}))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let result = probe_for(&server, Duration::from_millis(200)).probe().await;
    assert_matches!(result, Err(ProbeError::Timeout { timeout_ms: 200 }));
}

#[tokio::test]
async fn test_monitor_against_live_endpoint() {
    let server = health_server(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"}))).await;
    let config = MonitorConfig {
        probe_timeout: Duration::from_secs(2),
        ..MonitorConfig::default()
    };
    let store = LocalFallbackStore::new(Arc::new(MemoryBackend::new()));
    let probe = probe_for(&server, config.probe_timeout);
    let monitor = ConnectionMonitor::new(config, Arc::new(probe), store);

    assert!(monitor.check_connection(false).await);
    assert!(monitor.status().is_online);
    assert!(monitor.store().server_status().unwrap().is_online);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_monitor_with_server_down() {
    // Bind then drop so the port refuses connections
    let server = MockServer::start().await;
    let url = format!("{}/api/health", server.uri());
    drop(server);

    let probe = HttpHealthProbe::new(url, Duration::from_secs(2)).unwrap();
    let store = LocalFallbackStore::new(Arc::new(MemoryBackend::new()));
    let monitor = ConnectionMonitor::new(MonitorConfig::default(), Arc::new(probe), store);

    assert!(!monitor.check_connection(false).await);
    assert_eq!(monitor.status().retry_count, 1);
}

fn remote_for(server: &MockServer) -> HttpTaskRemote {
    let app = AppConfig::builder().server_url(server.uri()).build().unwrap();
    HttpTaskRemote::new(Config::with_app_config(app).unwrap())
}

#[tokio::test]
async fn test_task_client_sends_bearer_token() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("Authorization", "Bearer jwt-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "t1", "title": "Essay draft", "priority": "high", "completed": false}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tasks = remote_for(&mock_server).fetch_tasks("jwt-123").await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, "t1");
    assert_eq!(tasks[0].task.title, "Essay draft");
}

#[tokio::test]
async fn test_task_client_create_and_update() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_partial_json(json!({"title": "Lab report"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "srv-9", "title": "Lab report", "priority": "medium", "completed": false
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/tasks/srv-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "srv-9", "title": "Lab report", "priority": "medium", "completed": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let remote = remote_for(&mock_server);
    let mut task = Task::new("Lab report");
    let created = remote.create_task("jwt", &task).await.unwrap();
    assert_eq!(created.id, "srv-9");

    task.completed = true;
    let updated = remote.update_task("jwt", &created.id, &task).await.unwrap();
    assert!(updated.task.completed);
}

#[tokio::test]
async fn test_task_client_reports_status_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let result = remote_for(&mock_server).fetch_tasks("expired").await;
    assert_matches!(
        result,
        Err(studymate::shared::ApiError::Status { status: 401, body }) if body == "Unauthorized"
    );
}
