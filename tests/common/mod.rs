#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::{json, Value};
use sqlx::AnyPool;
use std::sync::Once;
use tower::ServiceExt;

use user_api::api::routes::create_routes;
use user_api::config::{run_migrations, DatabaseConfig, DbDriver};
use user_api::middleware::ApiResponse;

static INIT: Once = Once::new();

/// Initialize test logging
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("user_api=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Fresh, migrated in-memory database
pub async fn test_pool() -> AnyPool {
    init_test_logging();

    let pool = DatabaseConfig::in_memory()
        .create_pool()
        .await
        .expect("Failed to open in-memory database");

    run_migrations(&pool, DbDriver::Sqlite)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Router backed by its own in-memory database
pub struct TestApp {
    pub router: Router,
    pub pool: AnyPool,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = test_pool().await;
        let router = create_routes(pool.clone());

        Self { router, pool }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");

        let request = match body {
            Some(body) => builder.body(Body::from(body.to_string())).unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        TestResponse {
            status,
            body: bytes.to_vec(),
        }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> TestResponse {
        self.request(Method::DELETE, uri, None).await
    }

    /// Create a user through the API and return its id
    pub async fn create_user(&self, body: Value) -> i64 {
        let response = self.post("/api/v1/users", body).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        response.data()["id"].as_i64().expect("created user has an id")
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn envelope(&self) -> ApiResponse<Value> {
        serde_json::from_slice(&self.body).expect("response body is an envelope")
    }

    pub fn data(&self) -> Value {
        self.envelope().data.unwrap_or(Value::Null)
    }
}

/// Mock data generators
pub struct MockDataGenerator;

impl MockDataGenerator {
    /// Valid create payload with a unique email
    pub fn user_payload(seq: usize) -> Value {
        let name: String = Name().fake();
        let email: String = SafeEmail().fake();

        json!({
            "name": name,
            "email": format!("{seq}.{email}"),
            "age": (18i64..90).fake::<i64>(),
            "phone": "1234567890",
        })
    }
}
