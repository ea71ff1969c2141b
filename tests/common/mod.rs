//! Common test utilities for E2E tests

use authgate::{AppState, config};
use serde_json::{Value, json};
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        Self::with_config(config::AppConfig::for_tests()).await
    }

    /// Create a test server with a custom configuration
    pub async fn with_config(config: config::AppConfig) -> Self {
        authgate::metrics::init_metrics();

        // Initialize app state
        let state = AppState::new(config);

        // Create HTTP client
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        // Build router
        let app = authgate::build_router(state.clone());

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Register a user through the API
    pub async fn register(&self, username: &str, password: &str, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/register"))
            .json(&json!({
                "username": username,
                "password": password,
                "email": email,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Log in through the API
    pub async fn login(&self, username: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .unwrap()
    }

    /// Register `testuser` and return a fresh session token
    pub async fn create_test_token(&self) -> String {
        let response = self
            .register("testuser", "password123", "test@example.com")
            .await;
        assert_eq!(response.status(), 201);

        let response = self.login("testuser", "password123").await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        body["token"]
            .as_str()
            .expect("login returns a token")
            .to_string()
    }
}
