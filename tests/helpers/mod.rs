//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use papers_api::AppState;
use papers_core::config::AppConfig;
use papers_database::MemoryStore;
use papers_entity::node::Node;
use papers_entity::user::User;
use papers_storage::LocalBlobStore;

const BOUNDARY: &str = "papers-test-boundary";

/// Test application backed by the in-memory store and a temporary upload root.
pub struct TestApp {
    /// The Axum app for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    uploads: TempDir,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let uploads = TempDir::new().expect("Failed to create upload dir");
        let mut config = AppConfig::default();
        config.storage.upload_root = uploads.path().display().to_string();

        let blobs = LocalBlobStore::new(uploads.path())
            .await
            .expect("Failed to init blob store");

        let state = AppState::assemble(
            config.clone(),
            Arc::new(MemoryStore::<Node>::new()),
            Arc::new(MemoryStore::<User>::new()),
            Arc::new(blobs),
        );

        Self {
            router: papers_api::build_app(state),
            config,
            uploads,
        }
    }

    /// Absolute path of a blob URI on disk.
    pub fn blob_path(&self, uri: &str) -> PathBuf {
        self.uploads.path().join(uri)
    }

    /// Register an account and return its id
    pub async fn register(&self, fullname: &str, email: &str, password: &str) -> String {
        let body = json!({
            "fullname": fullname,
            "email": email,
            "password": password,
            "password_conf": password,
        });
        let response = self.request("POST", "/api/users", Some(body), None).await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Registration failed: {:?}",
            response.body
        );
        response.data()["id"]
            .as_str()
            .expect("No id in registration response")
            .to_string()
    }

    /// Login and return the bearer token
    pub async fn login(&self, email: &str, password: &str) -> String {
        let body = json!({ "email": email, "password": password });
        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.data()["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Register `name@test.com` and log in, returning `(user_id, token)`
    pub async fn signed_in(&self, name: &str) -> (String, String) {
        let email = format!("{name}@test.com");
        let id = self.register(name, &email, "password123").await;
        let token = self.login(&email, "password123").await;
        (id, token)
    }

    /// Create a folder and return its id
    pub async fn folder(&self, user: &str, token: &str, name: &str, parent: Option<&str>) -> String {
        let body = json!({ "name": name, "parent_id": parent });
        let response = self
            .request("POST", &format!("/api/users/{user}/folders"), Some(body), Some(token))
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Folder creation failed: {:?}",
            response.body
        );
        response.id()
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Upload `contents` as `file_name` through the multipart route
    pub async fn upload(
        &self,
        user: &str,
        token: &str,
        file_name: &str,
        contents: &[u8],
        parent: Option<&str>,
    ) -> TestResponse {
        let mut body = Vec::new();
        if let Some(parent) = parent {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"parent_id\"\r\n\r\n{parent}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/users/{user}/files"))
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("Authorization", format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `data` member of a success body.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `data.id` as a string.
    pub fn id(&self) -> String {
        self.data()["id"]
            .as_str()
            .expect("No id in response")
            .to_string()
    }

    /// The `error` code of a failure body.
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or("")
    }
}
