use gcphcp_api::{CallbackGateway, ErrorKind, ExecutionGateway, GatewayConfig, WorkflowsClient};
use gcphcp_types::{ExecutionHandle, ExecutionState, WorkflowScope};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROJECT: &str = "demo-project";
const REGION: &str = "us-central1";
const EXECUTION: &str = "projects/demo-project/locations/us-central1/workflows/get/executions/e1";

fn client_for(server: &MockServer) -> WorkflowsClient {
    let config = GatewayConfig::new(WorkflowScope::new(PROJECT, REGION)).with_base_url(server.uri());
    WorkflowsClient::with_token(&config, "test-token").expect("client")
}

#[tokio::test]
async fn create_then_read_until_succeeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/projects/{PROJECT}/locations/{REGION}/workflows/get/executions")))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({ "argument": "{\"namespace\":\"default\",\"resource_type\":\"pods\"}" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": EXECUTION,
            "state": "ACTIVE",
            "startTime": "2025-03-01T12:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{EXECUTION}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": EXECUTION,
            "state": "ACTIVE",
            "startTime": "2025-03-01T12:00:00Z"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/{EXECUTION}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": EXECUTION,
            "state": "SUCCEEDED",
            "result": "{\"items\":[]}",
            "startTime": "2025-03-01T12:00:00Z",
            "endTime": "2025-03-01T12:00:02Z"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let handle = client
        .create_execution("get", &json!({ "namespace": "default", "resource_type": "pods" }))
        .await
        .expect("created");
    assert_eq!(handle.workflow(), "get");
    assert_eq!(handle.id(), "e1");

    let first = client.get_execution(&handle).await.expect("first read");
    assert_eq!(first.state, ExecutionState::Active);
    assert_eq!(first.result, None);

    let second = client.get_execution(&handle).await.expect("second read");
    assert_eq!(second.state, ExecutionState::Succeeded);
    assert_eq!(second.result, Some(json!({ "items": [] })));
}

#[tokio::test]
async fn missing_workflow_classifies_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": { "code": 404, "message": "Workflow not found", "status": "NOT_FOUND" }
        })))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .create_execution("nope", &json!({}))
        .await
        .expect_err("not found");
    assert_eq!(error.kind(), ErrorKind::ResourceNotFound);
    assert!(error.remediation().is_some());
}

#[tokio::test]
async fn forbidden_classifies_as_permission_denied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("caller lacks workflows.executions.get"))
        .mount(&server)
        .await;

    let handle: ExecutionHandle = EXECUTION.parse().expect("handle");
    let error = client_for(&server).get_execution(&handle).await.expect_err("denied");
    assert_eq!(error.kind(), ErrorKind::PermissionDenied);
}

#[tokio::test]
async fn unknown_state_is_a_remote_call_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": EXECUTION,
            "state": "STATE_UNSPECIFIED",
            "startTime": "2025-03-01T12:00:00Z"
        })))
        .mount(&server)
        .await;

    let handle: ExecutionHandle = EXECUTION.parse().expect("handle");
    let error = client_for(&server).get_execution(&handle).await.expect_err("undecodable");
    assert_eq!(error.kind(), ErrorKind::RemoteCallFailed);
}

#[tokio::test]
async fn list_executions_follows_pages_up_to_the_limit() {
    let server = MockServer::start().await;
    let executions_path = format!("/projects/{PROJECT}/locations/{REGION}/workflows/get/executions");
    let execution = |id: &str| {
        json!({
            "name": format!("projects/{PROJECT}/locations/{REGION}/workflows/get/executions/{id}"),
            "state": "SUCCEEDED",
            "result": "{}",
            "startTime": "2025-03-01T12:00:00Z",
            "endTime": "2025-03-01T12:00:01Z"
        })
    };
    Mock::given(method("GET"))
        .and(path(executions_path.clone()))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "executions": [execution("c"), execution("d")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(executions_path))
        .and(query_param("pageSize", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "executions": [execution("a"), execution("b")],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    let records = client_for(&server).list_executions("get", 3).await.expect("listed");
    let ids: Vec<&str> = records.iter().map(|record| record.handle.id()).collect();
    assert_eq!(ids, ["a", "b", "c"]);
}

#[tokio::test]
async fn list_workflows_shortens_names() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/projects/{PROJECT}/locations/{REGION}/workflows")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "workflows": [
                { "name": format!("projects/{PROJECT}/locations/{REGION}/workflows/get"), "state": "ACTIVE", "revisionId": "000001-a1b" },
                { "name": format!("projects/{PROJECT}/locations/{REGION}/workflows/logs"), "state": "ACTIVE", "revisionId": "000004-c2d" }
            ]
        })))
        .mount(&server)
        .await;

    let workflows = client_for(&server).list_workflows().await.expect("listed");
    let names: Vec<&str> = workflows.iter().map(|workflow| workflow.name.as_str()).collect();
    assert_eq!(names, ["get", "logs"]);
}

#[tokio::test]
async fn empty_callback_list_is_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{EXECUTION}/callbacks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "callbacks": [] })))
        .mount(&server)
        .await;

    let handle: ExecutionHandle = EXECUTION.parse().expect("handle");
    let callbacks = client_for(&server).list_callbacks(&handle).await.expect("listed");
    assert!(callbacks.is_empty());
}

#[tokio::test]
async fn callbacks_resolve_to_trigger_urls_on_the_same_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/{EXECUTION}/callbacks")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "callbacks": [{ "name": format!("{EXECUTION}/callbacks/approve"), "method": "POST" }]
        })))
        .mount(&server)
        .await;

    let handle: ExecutionHandle = EXECUTION.parse().expect("handle");
    let callbacks = client_for(&server).list_callbacks(&handle).await.expect("listed");
    assert_eq!(callbacks.len(), 1);
    assert_eq!(callbacks[0].url, format!("{}/{EXECUTION}/callbacks/approve", server.uri()));
}

#[tokio::test]
async fn trigger_sends_payload_and_accepts_2xx() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cb"))
        .and(body_json(json!({ "approved": true })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client_for(&server)
        .trigger_callback(&format!("{}/cb", server.uri()), "", Some(&json!({ "approved": true })))
        .await
        .expect("triggered");
}

#[tokio::test]
async fn trigger_failure_keeps_the_response_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cb"))
        .respond_with(ResponseTemplate::new(500).set_body_string("callback handler exploded"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .trigger_callback(&format!("{}/cb", server.uri()), "POST", None)
        .await
        .expect_err("server error");
    assert_eq!(error.kind(), ErrorKind::RemoteCallFailed);
    let rendered = error.to_string();
    assert!(rendered.contains("500"), "{rendered}");
    assert!(rendered.contains("callback handler exploded"), "{rendered}");
}

#[tokio::test]
async fn classified_trigger_failure_still_shows_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cb"))
        .respond_with(ResponseTemplate::new(404).set_body_string("callback cb1 was already received"))
        .mount(&server)
        .await;

    let error = client_for(&server)
        .trigger_callback(&format!("{}/cb", server.uri()), "POST", None)
        .await
        .expect_err("not found");
    assert_eq!(error.kind(), ErrorKind::ResourceNotFound);
    let rendered = error.to_string();
    assert!(rendered.contains("HTTP 404: callback cb1 was already received"), "{rendered}");
}

#[tokio::test]
async fn trigger_refuses_untrusted_hosts() {
    let server = MockServer::start().await;
    let error = client_for(&server)
        .trigger_callback("https://collector.example.net/cb", "POST", None)
        .await
        .expect_err("rejected");
    assert_eq!(error.kind(), ErrorKind::InvalidConfiguration);
}
