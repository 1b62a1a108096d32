//! End-to-end API tests against the in-memory store.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use main_server::{config::Config, create_app, create_state};
use project_store::MemoryProjectStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn test_app() -> Router {
    let config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        jwt_secret: "integration-test-secret-key-long-enough".to_string(),
        jwt_expiration_hours: 24,
        log_level: "warn".to_string(),
    };
    create_app(create_state(config, MemoryProjectStore::new()))
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(match body {
            Some(value) => Body::from(value.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Registers a user and returns (token, user id).
async fn register(app: &Router, username: &str, role: &str) -> (String, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret123",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    (
        body["token"].as_str().unwrap().to_string(),
        body["user"]["id"].as_str().unwrap().to_string(),
    )
}

async fn create_project(app: &Router, token: &str, title: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/projects",
        Some(token),
        Some(json!({ "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create project failed: {body}");
    body["project"]["id"].as_str().unwrap().to_string()
}

async fn create_task(
    app: &Router,
    token: &str,
    project_id: &str,
    assignees: Vec<&str>,
) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/tasks",
        Some(token),
        Some(json!({
            "title": "Implement feature",
            "project_id": project_id,
            "assignee_ids": assignees,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "create task failed: {body}");
    body["task"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_unauthenticated_request_is_rejected() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/api/projects", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_round_trip() {
    let app = test_app();
    register(&app, "alice", "developer").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "developer");
    assert!(body["token"].as_str().is_some());

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({ "email": "alice@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sole_assignee_completion_marks_task_done() {
    let app = test_app();
    let (manager_token, _) = register(&app, "mgr", "manager").await;
    let (dev_token, dev_id) = register(&app, "dev", "developer").await;

    let project_id = create_project(&app, &manager_token, "Rollup Project").await;
    let task_id = create_task(&app, &manager_token, &project_id, vec![&dev_id]).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}/status"),
        Some(&dev_token),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "status update failed: {body}");
    assert_eq!(body["assignment"]["status"], "completed");

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/{task_id}"),
        Some(&manager_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "done");
}

#[tokio::test]
async fn test_foreign_manager_cannot_update_project() {
    let app = test_app();
    let (m1_token, _) = register(&app, "mgr1", "manager").await;
    let (m2_token, _) = register(&app, "mgr2", "manager").await;

    let project_id = create_project(&app, &m1_token, "Original Title").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/projects/{project_id}"),
        Some(&m2_token),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "PERMISSION_DENIED");

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}"),
        Some(&m1_token),
        None,
    )
    .await;
    assert_eq!(body["title"], "Original Title");
}

#[tokio::test]
async fn test_assignee_cannot_touch_title() {
    let app = test_app();
    let (manager_token, _) = register(&app, "mgr", "manager").await;
    let (dev_token, dev_id) = register(&app, "dev", "developer").await;

    let project_id = create_project(&app, &manager_token, "Field Rules").await;
    let task_id = create_task(&app, &manager_token, &project_id, vec![&dev_id]).await;

    // Progress-only fields pass.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}"),
        Some(&dev_token),
        Some(json!({ "status": "in_progress", "actual_hours": 2.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // A title next to them fails the whole request.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/tasks/{task_id}"),
        Some(&dev_token),
        Some(json!({ "status": "review", "title": "Renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/tasks/{task_id}"),
        Some(&manager_token),
        None,
    )
    .await;
    assert_eq!(body["title"], "Implement feature");
    assert_eq!(body["status"], "in_progress");
}

#[tokio::test]
async fn test_duplicate_single_assign_conflicts() {
    let app = test_app();
    let (manager_token, _) = register(&app, "mgr", "manager").await;
    let (_, dev_id) = register(&app, "dev", "developer").await;

    let project_id = create_project(&app, &manager_token, "Conflicts").await;
    let task_id = create_task(&app, &manager_token, &project_id, vec![&dev_id]).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/tasks/{task_id}/assign-user"),
        Some(&manager_token),
        Some(json!({ "user_id": dev_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_delete_project_cascades_and_404s_after() {
    let app = test_app();
    let (admin_token, _) = register(&app, "root", "admin").await;
    let (manager_token, _) = register(&app, "mgr", "manager").await;
    let (_, dev_id) = register(&app, "dev", "developer").await;

    let project_id = create_project(&app, &manager_token, "Doomed").await;
    let task_id = create_task(&app, &manager_token, &project_id, vec![&dev_id]).await;

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/tasks/{task_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}"),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "RESOURCE_NOT_FOUND");
}

#[tokio::test]
async fn test_team_membership_endpoints() {
    let app = test_app();
    let (manager_token, manager_id) = register(&app, "mgr", "manager").await;
    let (_, dev_id) = register(&app, "dev", "developer").await;

    let project_id = create_project(&app, &manager_token, "Team Project").await;

    // Zero tasks: the manager is the whole team.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/projects/{project_id}/team"),
        Some(&manager_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_id"], manager_id.as_str());
    assert_eq!(body[0]["project_role"], "manager");

    // Adding a member creates the placeholder task and assigns them.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/projects/{project_id}/team"),
        Some(&manager_token),
        Some(json!({ "user_id": dev_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
    assert_eq!(body[1]["project_role"], "member");
    assert_eq!(body[1]["tasks"][0]["title"], "Project Setup");

    // Removing the member strips their assignments; the manager stays.
    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/api/projects/{project_id}/team/{dev_id}"),
        Some(&manager_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["user_id"], manager_id.as_str());
}

#[tokio::test]
async fn test_non_admin_cannot_change_role() {
    let app = test_app();
    let (dev_token, dev_id) = register(&app, "dev", "developer").await;

    // Profile edits are fine; a role field in the same request is not.
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{dev_id}"),
        Some(&dev_token),
        Some(json!({ "username": "dev-renamed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/{dev_id}"),
        Some(&dev_token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_validation_failures_list_fields() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/users/register",
        None,
        Some(json!({ "username": "ab", "email": "nope", "password": "123" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_FAILED");
    assert_eq!(body["error"]["fields"].as_array().unwrap().len(), 3);
}
