#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use cardhall::db::Database;
use cardhall::jwt::JwtConfig;
use cardhall::password::hash_password;
use cardhall::secret::SigningSecret;
use cardhall::{ServerConfig, create_app};
use tower::ServiceExt;

pub struct TestApp {
    pub app: Router,
    pub db: Database,
    pub jwt: JwtConfig,
}

/// Start an app against an in-memory database with a deterministic secret.
pub async fn setup() -> TestApp {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let secret = SigningSecret::from_string("test-jwt-secret-for-testing".to_string());
    let jwt = JwtConfig::new(&secret);
    let config = ServerConfig {
        db: db.clone(),
        secret,
    };
    TestApp {
        app: create_app(&config),
        db,
        jwt,
    }
}

impl TestApp {
    /// Create a user directly in the store. Returns the user id.
    pub async fn create_user(&self, username: &str, email: &str, password: &str) -> i64 {
        let hash = hash_password(password).expect("Failed to hash password");
        self.db
            .users()
            .create(username, email, &hash, None)
            .await
            .expect("Failed to create user")
    }

    /// Create an admin user. Returns the user id.
    pub async fn create_admin(&self, username: &str, email: &str, password: &str) -> i64 {
        let id = self.create_user(username, email, password).await;
        self.db
            .users()
            .set_admin(id, true)
            .await
            .expect("Failed to set admin");
        id
    }

    /// Create a superadmin user. Returns the user id.
    pub async fn create_superadmin(&self, username: &str, email: &str, password: &str) -> i64 {
        let id = self.create_user(username, email, password).await;
        self.db
            .users()
            .make_superadmin(id)
            .await
            .expect("Failed to make superadmin");
        id
    }

    pub fn access_token(&self, id: i64, admin: bool) -> String {
        self.jwt
            .issue_access_token(id, admin)
            .expect("Failed to issue access token")
    }

    pub fn refresh_token(&self, id: i64, admin: bool) -> String {
        self.jwt
            .issue_refresh_token(id, admin)
            .expect("Failed to issue refresh token")
    }

    pub async fn request(&self, request: Request<Body>) -> Response<Body> {
        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.request(build_request("GET", uri, token, None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: &str) -> Response<Body> {
        self.request(build_request("POST", uri, token, Some(body)))
            .await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: &str) -> Response<Body> {
        self.request(build_request("PUT", uri, token, Some(body)))
            .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Response<Body> {
        self.request(build_request("DELETE", uri, token, None))
            .await
    }
}

fn build_request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_default())
        .expect("Failed to build request")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not valid JSON")
}

/// Assert status and return the JSON body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    assert_eq!(response.status(), status);
    body_json(response).await
}
