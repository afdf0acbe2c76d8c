//! E2E tests for registration, login, logout and the single-device rule

mod common;

use common::{TEST_PASSWORD, TestServer, error_from, token_from};
use serde_json::{Value, json};

#[tokio::test]
async fn test_second_login_refused_until_logout() {
    let server = TestServer::new().await;
    let t1 = server.register("Alice", "alice@x.com").await;

    // Another device, correct credentials
    let response = server.login_response("alice@x.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 403);
    assert_eq!(
        error_from(response).await,
        "You are already logged in on another device. Please logout first."
    );

    // T1 still works
    let response = server.get_authed("/api/users/me", &t1).await;
    assert_eq!(response.status(), 200);

    let response = server.logout(&t1).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Logged out successfully");

    let response = server.login_response("alice@x.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 200);
    let t2 = token_from(response).await;
    assert_ne!(t1, t2);

    let response = server.get_authed("/api/users/me", &t1).await;
    assert_eq!(response.status(), 401);
    assert_eq!(
        error_from(response).await,
        "Session invalid or expired. Please login again."
    );

    let response = server.get_authed("/api/users/me", &t2).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_wrong_password_issues_no_session() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;
    server.logout(&token).await;

    let response = server.login_response("alice@x.com", "wrong").await;
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid email or password");
    assert!(body.get("token").is_none());

    let user = server
        .state
        .db
        .get_user_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(server.state.db.get_session(&user.id).await.unwrap().is_none());

    // Not locked out afterwards
    let response = server.login_response("alice@x.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_unknown_email_is_indistinguishable() {
    let server = TestServer::new().await;

    let response = server.login_response("nobody@x.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 400);
    assert_eq!(error_from(response).await, "Invalid email or password");
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/users/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
    assert_eq!(error_from(response).await, "Access denied. No token provided.");

    let response = server.get_authed("/api/users/me", "   ").await;
    assert_eq!(response.status(), 401);
    assert_eq!(error_from(response).await, "Access denied. No token provided.");
}

#[tokio::test]
async fn test_tampered_token_rejected() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;

    let mut tampered = token.into_bytes();
    let last = tampered.len() - 1;
    tampered[last] = if tampered[last] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();

    let response = server.get_authed("/api/users/me", &tampered).await;
    assert_eq!(response.status(), 401);
    assert_eq!(error_from(response).await, "Invalid token.");

    let response = server.get_authed("/api/users/me", "not-a-token").await;
    assert_eq!(response.status(), 401);
    assert_eq!(error_from(response).await, "Invalid token.");
}

#[tokio::test]
async fn test_bearer_prefix_is_not_accepted() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;

    let response = server
        .get_authed("/api/users/me", &format!("Bearer {token}"))
        .await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_logout_invalidates_token() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;

    assert_eq!(server.logout(&token).await.status(), 200);

    let response = server.logout(&token).await;
    assert_eq!(response.status(), 401);
    assert_eq!(
        error_from(response).await,
        "Session invalid or expired. Please login again."
    );
}

#[tokio::test]
async fn test_deleted_user_token_rejected() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;

    let user = server
        .state
        .db
        .get_user_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(server.state.db.delete_user(&user.id).await.unwrap());

    let response = server.get_authed("/api/users/me", &token).await;
    assert_eq!(response.status(), 401);
    assert_eq!(error_from(response).await, "User not found.");
}

#[tokio::test]
async fn test_me_returns_profile_without_secrets() {
    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;

    let response = server.get_authed("/api/users/me", &token).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Alice");
    assert_eq!(body["email"], "alice@x.com");
    assert!(body["id"].is_string());
    assert!(body.get("password_hash").is_none());
    assert!(body.get("token").is_none());
}

#[tokio::test]
async fn test_register_validation() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/users"))
        .json(&json!({ "email": "alice@x.com", "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(
        error_from(response).await,
        "Name, email, and password are required"
    );

    let response = server.register_response("Alice", "alice@x.com", "pw").await;
    assert_eq!(response.status(), 400);
    assert_eq!(
        error_from(response).await,
        "Password must be at least 4 characters"
    );
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let server = TestServer::new().await;
    server.register("Alice", "alice@x.com").await;

    let response = server
        .register_response("Other Alice", "alice@x.com", TEST_PASSWORD)
        .await;
    assert_eq!(response.status(), 409);
    assert_eq!(error_from(response).await, "Email already exists");
}

#[tokio::test]
async fn test_login_requires_fields() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "email": "alice@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(error_from(response).await, "Email and password are required");
}

#[tokio::test]
async fn test_expired_token_rejected_by_gate() {
    use chrono::{Duration, Utc};

    let server = TestServer::new().await;
    let token = server.register("Alice", "alice@x.com").await;
    server.logout(&token).await;

    let user = server
        .state
        .db
        .get_user_by_email("alice@x.com")
        .await
        .unwrap()
        .unwrap();
    let stale = server
        .state
        .sessions
        .issue_at(&user, Utc::now() - Duration::days(8))
        .await
        .unwrap();

    let response = server.get_authed("/api/users/me", &stale).await;
    assert_eq!(response.status(), 401);
    assert_eq!(
        error_from(response).await,
        "Token has expired. Please login again."
    );

    // The stale row does not block a fresh login
    let response = server.login_response("alice@x.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_register_without_body_reports_missing_fields() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert_eq!(
        error_from(response).await,
        "Name, email, and password are required"
    );
}

#[tokio::test]
async fn test_malformed_login_body_is_json_error() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/users/login"))
        .header("Content-Type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());

    let response = server
        .client
        .post(server.url("/api/users/login"))
        .json(&json!({ "email": 42, "password": TEST_PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}
