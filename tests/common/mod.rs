//! Common test utilities for E2E tests

#![allow(dead_code)]

use serde_json::{Value, json};
use storefront::{AppState, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_CLIENT_URL: &str = "http://localhost:5173";
pub const TEST_PASSWORD: &str = "pw1234";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

/// Test configuration rooted at `temp_dir`
pub fn test_config(temp_dir: &TempDir) -> config::AppConfig {
    config::AppConfig {
        server: config::ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Let OS assign port
            client_url: TEST_CLIENT_URL.to_string(),
        },
        database: config::DatabaseConfig {
            path: temp_dir.path().join("test.db"),
        },
        auth: config::AuthConfig {
            token_secret: "test-secret-key-that-is-32-bytes-long!!".to_string(),
            token_ttl_seconds: 604800,
            min_password_length: 4,
        },
        logging: config::LoggingConfig {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = storefront::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST /api/users and return the raw response
    pub async fn register_response(&self, name: &str, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "name": name, "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// Register a user and return the issued token
    pub async fn register(&self, name: &str, email: &str) -> String {
        let response = self.register_response(name, email, TEST_PASSWORD).await;
        assert_eq!(response.status(), 201);
        token_from(response).await
    }

    /// POST /api/users/login and return the raw response
    pub async fn login_response(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// POST /api/users/logout with `token`
    pub async fn logout(&self, token: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users/logout"))
            .header("Authorization", token)
            .send()
            .await
            .unwrap()
    }

    /// GET `path` with `token` as the Authorization header
    pub async fn get_authed(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("Authorization", token)
            .send()
            .await
            .unwrap()
    }

    /// Seed the catalog and return it, newest first
    pub async fn seed_items(&self) -> Vec<Value> {
        let response = self
            .client
            .post(self.url("/api/items/seed"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        self.client
            .get(self.url("/api/items"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap()
    }

    /// POST /api/carts with `item_id`
    pub async fn add_to_cart(&self, token: &str, item_id: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/carts"))
            .header("Authorization", token)
            .json(&json!({ "itemId": item_id }))
            .send()
            .await
            .unwrap()
    }
}

/// Extract `token` from a register/login response body
pub async fn token_from(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["token"].as_str().unwrap().to_string()
}

/// Extract `error` from a JSON error body
pub async fn error_from(response: reqwest::Response) -> String {
    let body: Value = response.json().await.unwrap();
    body["error"].as_str().unwrap().to_string()
}
