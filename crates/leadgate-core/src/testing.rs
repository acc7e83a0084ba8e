//! Test harness: an in-memory app driven through the real router.
//!
//! Requests go through `tower::ServiceExt::oneshot`, so the full middleware
//! stack runs without binding a socket.
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_signup() {
//!     let app = TestApp::new().await;
//!     let res = app
//!         .post("/api/auth/signup", serde_json::json!({
//!             "email": "a@x.com", "password": "Secret123!", "name": "A"
//!         }))
//!         .await;
//!     assert_eq!(res.status, 201);
//! }
//! ```

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, header};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use crate::config::Config;
use crate::migrations::Migrator;

/// Config for tests: in-memory sqlite, fixed secrets, no SMTP, no Google.
pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_access_secret: "test-access-secret".to_string(),
        jwt_refresh_secret: "test-refresh-secret".to_string(),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        environment: "test".to_string(),
        frontend_url: "http://localhost:3000".to_string(),
        google_client_id: None,
        google_client_secret: None,
        google_redirect_url: None,
        smtp_host: None,
        smtp_port: 587,
        smtp_user: None,
        smtp_pass: None,
        smtp_from: None,
    }
}

/// Fresh migrated in-memory database for unit tests.
pub async fn test_db() -> DatabaseConnection {
    let db = crate::db::connect(&test_config())
        .await
        .expect("Failed to connect test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to migrate test database");
    db
}

/// A test application with an in-memory SQLite database.
pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a new test app.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a new test app with a custom config.
    pub async fn with_config(config: Config) -> Self {
        let app = crate::App::with_config(config)
            .await
            .expect("Failed to create test app");

        let router = app.router();
        TestApp {
            router,
            db: app.db,
            config: Arc::new(app.config),
        }
    }

    /// Send a request through the router.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        cookie: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        TestResponse::from_response(response).await
    }

    /// Send a GET request.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None, None, None).await
    }

    /// Send a GET request with an auth token.
    pub async fn get_with_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::GET, path, Some(token), None, None)
            .await
    }

    /// Send a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: serde_json::Value) -> TestResponse {
        self.request(Method::POST, path, None, None, Some(body))
            .await
    }

    /// Send a POST request with an auth token and JSON body.
    pub async fn post_with_auth(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> TestResponse {
        self.request(Method::POST, path, Some(token), None, Some(body))
            .await
    }

    /// Send a bodyless POST carrying a cookie header.
    pub async fn post_with_cookie(&self, path: &str, cookie: &str) -> TestResponse {
        self.request(Method::POST, path, None, Some(cookie), None)
            .await
    }

    /// Send a PATCH request with an auth token and JSON body.
    pub async fn patch_with_auth(
        &self,
        path: &str,
        token: &str,
        body: serde_json::Value,
    ) -> TestResponse {
        self.request(Method::PATCH, path, Some(token), None, Some(body))
            .await
    }

    /// Send a DELETE request with an auth token.
    pub async fn delete_with_auth(&self, path: &str, token: &str) -> TestResponse {
        self.request(Method::DELETE, path, Some(token), None, None)
            .await
    }

    /// Sign up a user and return the user object from the response.
    pub async fn signup_user(&self, email: &str, password: &str, name: &str) -> serde_json::Value {
        let res = self
            .post(
                "/api/auth/signup",
                serde_json::json!({ "email": email, "password": password, "name": name }),
            )
            .await;

        assert_eq!(res.status, 201, "Signup failed: {}", res.body);
        res.data()["user"].clone()
    }

    /// Login and return `(access_token, refresh_cookie_value)`.
    pub async fn login(&self, email: &str, password: &str) -> (String, String) {
        let res = self
            .post(
                "/api/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;

        assert_eq!(res.status, 200, "Login failed: {}", res.body);

        let access = res.data()["access_token"].as_str().unwrap().to_string();
        let refresh = res.refresh_cookie().expect("No refresh cookie set");
        (access, refresh)
    }
}

/// A simplified HTTP response for test assertions.
#[derive(Debug)]
pub struct TestResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    async fn from_response(response: axum::response::Response) -> Self {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
        }
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("Failed to parse response as JSON")
    }

    /// Get the data field from the response.
    pub fn data(&self) -> serde_json::Value {
        self.json()["data"].clone()
    }

    /// Get the machine-readable error code, if any.
    pub fn error_code(&self) -> Option<String> {
        self.json()["error"]["code"].as_str().map(str::to_string)
    }

    /// Value of the refresh-token cookie from `Set-Cookie`, if present.
    pub fn refresh_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookie| {
                let rest = cookie.strip_prefix("refresh_token=")?;
                Some(rest.split(';').next().unwrap_or("").to_string())
            })
    }
}
