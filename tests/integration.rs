//! End-to-end tests for the scenario runner
//!
//! These tests run complete scenarios against a wiremock server that mimics
//! the Idea API, verifying:
//! 1. Authentication and bearer propagation
//! 2. Ordered execution with the captured idea id
//! 3. Per-step failure reporting without aborting the run

use std::path::PathBuf;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use idea_e2e::testing::{run_scenario, run_scenario_file, TestScenario};
use idea_e2e::{Error, Settings};

const TOKEN: &str = "test-token";
const BEARER: &str = "Bearer test-token";

fn settings(server: &MockServer) -> Settings {
    Settings {
        base_url: format!("{}/api", server.uri()),
        email: "tester@example.com".to_string(),
        password: "123456".to_string(),
        timeout: None,
        user_agent: "idea-api-e2e-tests".to_string(),
    }
}

async fn mount_auth(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/User/Authentication"))
        .and(body_json(json!({
            "email": "tester@example.com",
            "password": "123456",
        })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_token(server: &MockServer) {
    mount_auth(
        server,
        ResponseTemplate::new(200).set_body_json(json!({ "accessToken": TOKEN })),
    )
    .await;
}

async fn mount_create(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/Idea/Create"))
        .and(header("Authorization", BEARER))
        .and(body_json(json!({
            "title": "Test Title",
            "description": "Testdescription.",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "msg": "Successfully created!", "id": null })),
        )
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_list(server: &MockServer, items: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/api/Idea/All"))
        .and(header("Authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_json(items))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_edit_and_delete(server: &MockServer, id: &str) {
    Mock::given(method("PUT"))
        .and(path("/api/Idea/Edit"))
        .and(query_param("ideaId", id))
        .and(header("Authorization", BEARER))
        .and(body_json(json!({
            "title": "EditedTestTitle",
            "description": "EditedTestDescription",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "msg": "Edited successfully", "id": id })),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/Idea/Delete"))
        .and(query_param("ideaId", id))
        .and(header("Authorization", BEARER))
        .respond_with(ResponseTemplate::new(200).set_body_string("\"The idea is deleted!\""))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_negative_paths(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/Idea/Create"))
        .and(body_json(json!({ "title": "Test Title" })))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": { "Description": ["The Description field is required."] }
        })))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/Idea/Edit"))
        .and(query_param("ideaId", "112233"))
        .respond_with(ResponseTemplate::new(400).set_body_string("There is no such idea!"))
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/Idea/Delete"))
        .and(query_param("ideaId", "1122334444"))
        .respond_with(ResponseTemplate::new(400).set_body_string("There is no such idea!"))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lifecycle_scenario_passes() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_create(&server).await;
    mount_list(
        &server,
        json!([
            { "id": "older", "title": "a", "description": "b" },
            { "id": "newest", "title": "Test Title", "description": "Testdescription." }
        ]),
    )
    .await;
    mount_edit_and_delete(&server, "newest").await;
    mount_negative_paths(&server).await;

    let result = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .expect("scenario should run");

    let failures: Vec<_> = result.failures().collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:?}");
    assert!(result.passed);
    assert_eq!(result.steps_run, 7);
    assert_eq!(result.steps_total, 7);
    assert_eq!(result.requests_sent, 7);

    let orders: Vec<u32> = result.outcomes.iter().map(|o| o.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[tokio::test]
async fn test_auth_failure_aborts_suite() {
    let server = MockServer::start().await;
    mount_auth(
        &server,
        ResponseTemplate::new(401).set_body_string("Invalid credentials"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/Idea/All"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .unwrap_err();

    match err {
        Error::Authentication(message) => {
            assert!(message.contains("401"), "message: {message}");
            assert!(message.contains("Invalid credentials"));
        }
        other => panic!("Expected Authentication error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_token_is_authentication_error() {
    let server = MockServer::start().await;
    mount_auth(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "  " })),
    )
    .await;

    let err = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)));
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_missing_token_field_is_authentication_error() {
    let server = MockServer::start().await;
    mount_auth(
        &server,
        ResponseTemplate::new(200).set_body_json(json!({ "user": "tester" })),
    )
    .await;

    let err = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("accessToken"));
}

#[tokio::test]
async fn test_unreachable_server_aborts_as_fatal() {
    let unreachable = Settings {
        base_url: "http://127.0.0.1:1/api".to_string(),
        email: "tester@example.com".to_string(),
        password: "123456".to_string(),
        timeout: Some(Duration::from_secs(5)),
        user_agent: "idea-api-e2e-tests".to_string(),
    };

    let err = run_scenario(&TestScenario::idea_lifecycle(), &unreachable, false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Authentication(_)), "got {err:?}");
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_empty_list_fails_dependent_steps_but_run_continues() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_create(&server).await;
    mount_list(&server, json!([])).await;
    mount_negative_paths(&server).await;

    let result = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .expect("scenario should run");

    assert!(!result.passed);
    assert_eq!(result.steps_run, 7);
    // Steps 3 and 4 fail before sending anything
    assert_eq!(result.requests_sent, 5);

    let failed: Vec<&str> = result.failures().map(|o| o.name.as_str()).collect();
    assert_eq!(
        failed,
        vec![
            "get_all_ideas_returns_non_empty_array",
            "edit_last_idea",
            "delete_last_idea"
        ]
    );

    let edit = result.outcome("edit_last_idea").unwrap();
    assert!(edit.error.as_deref().unwrap().contains("lastIdeaId"));

    for name in [
        "create_idea_with_correct_data",
        "create_idea_with_missing_required_fields",
        "edit_non_existing_idea",
        "delete_non_existing_idea",
    ] {
        assert!(result.outcome(name).unwrap().passed, "{name} should pass");
    }
}

#[tokio::test]
async fn test_unexpected_status_fails_only_that_step() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/Idea/Create"))
        .and(body_json(json!({
            "title": "Test Title",
            "description": "Testdescription.",
        })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([{ "id": "only" }])).await;
    mount_edit_and_delete(&server, "only").await;
    mount_negative_paths(&server).await;

    let result = run_scenario(&TestScenario::idea_lifecycle(), &settings(&server), false)
        .await
        .expect("scenario should run");

    assert_eq!(result.requests_sent, 7);
    let failed: Vec<_> = result.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].order, 1);
    assert!(failed[0]
        .error
        .as_deref()
        .unwrap()
        .contains("Expected status 200, got 500"));
}

#[tokio::test]
async fn test_non_json_body_is_decode_failure() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/Idea/Create"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Successfully created!"))
        .expect(1)
        .mount(&server)
        .await;

    let scenario = TestScenario {
        name: "create only".to_string(),
        description: None,
        steps: vec![TestScenario::idea_lifecycle().steps[0].clone()],
    };
    let result = run_scenario(&scenario, &settings(&server), false)
        .await
        .expect("scenario should run");

    assert!(!result.passed);
    assert_eq!(result.requests_sent, 1);
    let error = result.outcomes[0].error.as_deref().unwrap();
    assert!(error.starts_with("Failed to decode"), "error: {error}");
}

#[tokio::test]
async fn test_count_scenario_file() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_create(&server).await;

    // First listing happens before the create
    Mock::given(method("GET"))
        .and(path("/api/Idea/All"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "a" }])))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, json!([{ "id": "a" }, { "id": "b" }])).await;
    mount_edit_and_delete(&server, "b").await;

    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join("idea_count.yaml");
    let result = run_scenario_file(&path, &settings(&server), true)
        .await
        .expect("scenario should run");

    let failures: Vec<_> = result.failures().collect();
    assert!(failures.is_empty(), "unexpected failures: {failures:?}");
    assert_eq!(result.steps_run, 5);
    assert_eq!(result.requests_sent, 5);
}

#[tokio::test]
async fn test_invalid_scenario_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dup.yaml");
    std::fs::write(
        &path,
        r#"
name: duplicate orders
steps:
  - order: 1
    name: a
    request: { method: GET, path: /Idea/All }
  - order: 1
    name: b
    request: { method: GET, path: /Idea/All }
"#,
    )
    .unwrap();

    let server = MockServer::start().await;
    let err = run_scenario_file(&path, &settings(&server), false)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}
