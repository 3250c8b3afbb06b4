//! Handler tests for the users domain
//!
//! The users router is mounted the way the service mounts it (`/api/users`)
//! and wrapped in the full request pipeline, so these tests cover:
//! - status codes and response bodies
//! - the error envelope produced by the exception filter
//! - the log lines written for each request (captured in memory)

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_helpers::server::{create_router, default_hooks, request_pipeline};
use core_config::docs::DocsConfig;
use core_config::{AppInfo, Environment};
use domain_users::*;
use http_body_util::BodyExt;
use observability::{LogFormat, Logger, LoggerConfig, LoggerLayer, MemorySink, Severity, Stream};
use sea_orm::DbErr;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt; // For oneshot()
use tracing_subscriber::prelude::*;
use uuid::Uuid;

/// Repository whose every call fails like a dropped database connection
struct FailingRepository;

#[async_trait]
impl UserRepository for FailingRepository {
    async fn find_by_id(&self, _id: Uuid) -> UserResult<Option<User>> {
        Err(DbErr::Custom("connection reset by peer".to_string()).into())
    }

    async fn find_by_email(&self, _email: &Email) -> UserResult<Option<User>> {
        Err(DbErr::Custom("connection reset by peer".to_string()).into())
    }

    async fn find_all(&self, _page: u64, _limit: u64) -> UserResult<(Vec<User>, u64)> {
        Err(DbErr::Custom("connection reset by peer".to_string()).into())
    }

    async fn save(&self, _user: User) -> UserResult<User> {
        Err(DbErr::Custom("connection reset by peer".to_string()).into())
    }

    async fn delete(&self, _id: Uuid) -> UserResult<bool> {
        Err(DbErr::Custom("connection reset by peer".to_string()).into())
    }
}

struct TestApp {
    router: Router,
    sink: Arc<MemorySink>,
    logger: Logger,
}

impl TestApp {
    fn new<R: UserRepository + 'static>(repository: R, environment: Environment) -> Self {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new(
            LoggerConfig {
                format: LogFormat::Json,
                level: Severity::Info,
            },
            sink.clone(),
        );

        let apis = Router::new().nest("/users", handlers::router(UserService::new(repository)));
        let docs = DocsConfig {
            enabled: false,
            ..DocsConfig::default()
        };
        let router = create_router::<ApiDoc>(apis, &docs, AppInfo::new("users-test", "0.0.0"));
        let router = request_pipeline(
            router,
            &logger,
            environment,
            default_hooks(&logger, Duration::from_secs(1)),
        );

        Self {
            router,
            sink,
            logger,
        }
    }

    fn in_memory() -> Self {
        Self::new(InMemoryUserRepository::new(), Environment::Production)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn post_user(&self, body: Value) -> (StatusCode, Value) {
        let payload = body.to_string();
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header("content-type", "application/json")
                .header("content-length", payload.len())
                .header("x-request-id", "test-request")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    fn records_at(&self, level: &str) -> Vec<Value> {
        self.sink
            .json_records()
            .into_iter()
            .filter(|r| r["level"] == level)
            .collect()
    }
}

#[tokio::test]
async fn test_create_user_returns_201() {
    let app = TestApp::in_memory();

    let (status, body) = app
        .post_user(json!({"name": "John Doe", "email": "john@example.com"}))
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(Uuid::parse_str(body["id"].as_str().unwrap()).is_ok());
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["email"], "john@example.com");
    assert_eq!(body["isActive"], true);
    assert!(body["createdAt"].is_string());
    assert!(app.records_at("error").is_empty());
}

#[tokio::test]
async fn test_create_user_with_taken_email_returns_409() {
    let app = TestApp::in_memory();
    let payload = json!({"name": "John Doe", "email": "john@example.com"});

    let (first, _) = app.post_user(payload.clone()).await;
    assert_eq!(first, StatusCode::CREATED);

    let (status, body) = app.post_user(payload).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["statusCode"], 409);
    assert_eq!(body["error"], "Conflict");
    assert_eq!(body["message"], "User with this email already exists");
    assert_eq!(body["path"], "/api/users");
    assert_eq!(body["method"], "POST");
    assert_eq!(body["requestId"], "test-request");
    assert!(body.get("details").is_none());

    let warnings = app.records_at("warn");
    assert!(warnings.iter().any(|r| r["context"] == "ExceptionFilter"
        && r["message"] == "Client Error: User with this email already exists"));
    assert!(app.records_at("error").is_empty());
}

#[tokio::test]
async fn test_create_user_with_invalid_email_returns_400_with_details() {
    let app = TestApp::in_memory();

    let (status, body) = app
        .post_user(json!({"name": "John Doe", "email": "invalid-email"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"]["email"], json!(["email must be an email"]));
}

#[tokio::test]
async fn test_create_user_with_dotless_domain_returns_field_details() {
    let app = TestApp::in_memory();

    let (status, body) = app
        .post_user(json!({"name": "A", "email": "a@localhost"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "ValidationError");
    assert_eq!(body["details"]["email"], json!(["email must be an email"]));
}

#[tokio::test]
async fn test_create_user_rejects_unknown_fields() {
    let app = TestApp::in_memory();

    let (status, body) = app
        .post_user(json!({
            "name": "John Doe",
            "email": "john@example.com",
            "password": "hunter2"
        }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["statusCode"], 400);
    assert!(body["message"].as_str().unwrap().contains("password"));
}

#[tokio::test]
async fn test_request_body_is_redacted_in_logs() {
    let app = TestApp::in_memory();

    app.post_user(json!({
        "name": "John Doe",
        "email": "john@example.com",
        "password": "hunter2",
        "profile": {"token": "nested"}
    }))
    .await;

    let incoming = app
        .sink
        .json_records()
        .into_iter()
        .find(|r| r["message"] == "Incoming Request: POST /api/users")
        .expect("incoming request line");

    let body = &incoming["metadata"]["body"];
    assert_eq!(body["password"], "[REDACTED]");
    assert_eq!(body["name"], "John Doe");
    assert_eq!(body["profile"]["token"], "nested");

    for line in app.sink.lines() {
        assert!(!line.text.contains("hunter2"), "leaked: {}", line.text);
    }
}

#[tokio::test]
async fn test_get_missing_user_returns_404() {
    let app = TestApp::in_memory();
    let id = Uuid::new_v4();

    let (status, body) = app.get(&format!("/api/users/{id}")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");
    assert_eq!(body["error"], "NotFound");
    assert_eq!(body["path"], format!("/api/users/{id}"));
}

#[tokio::test]
async fn test_user_lookups_share_one_metrics_series() {
    observability::init_metrics().unwrap();
    let app = TestApp::in_memory();
    let ids = [Uuid::new_v4(), Uuid::new_v4()];

    for id in ids {
        let (status, _) = app.get(&format!("/api/users/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let rendered = observability::metrics_handler().await;
    let series: Vec<&str> = rendered
        .lines()
        .filter(|line| {
            line.starts_with("http_requests_total{")
                && line.contains(r#"path="/api/users/{id}""#)
                && line.contains(r#"status="404""#)
        })
        .collect();
    assert_eq!(series.len(), 1, "{rendered}");
    for id in ids {
        assert!(!rendered.contains(&id.to_string()));
    }
}

#[tokio::test]
async fn test_get_user_with_malformed_id_returns_400() {
    let app = TestApp::in_memory();

    let (status, body) = app.get("/api/users/not-a-uuid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed (uuid is expected)");
}

#[tokio::test]
async fn test_get_created_user() {
    let app = TestApp::in_memory();

    let (_, created) = app
        .post_user(json!({"name": "Ann", "email": "Ann@Example.com"}))
        .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app.get(&format!("/api/users/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["email"], "ann@example.com");
}

#[tokio::test]
async fn test_list_users_paginates() {
    let app = TestApp::in_memory();
    for i in 0..3 {
        let (status, _) = app
            .post_user(json!({
                "name": format!("User {i}"),
                "email": format!("user{i}@example.com")
            }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app.get("/api/users?page=2&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = app.get("/api/users").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 10);
}

#[tokio::test]
async fn test_list_users_rejects_out_of_range_limit() {
    let app = TestApp::in_memory();

    let (status, body) = app.get("/api/users?limit=500").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["limit"], json!(["limit must be between 1 and 100"]));
}

#[tokio::test]
async fn test_runtime_failure_returns_500_and_logs_one_error() {
    let app = TestApp::new(FailingRepository, Environment::Production);

    let (status, body) = app.get("/api/users").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["statusCode"], 500);
    assert_eq!(body["message"], "Internal server error");
    assert_eq!(body["error"], "DbErr");
    assert!(body.get("details").is_none());

    let errors = app.records_at("error");
    assert_eq!(errors.len(), 1);
    let message = errors[0]["message"].as_str().unwrap();
    assert!(message.contains("connection reset by peer"));
    assert!(errors[0]["trace"].as_str().unwrap().contains("connection reset by peer"));

    let error_lines: Vec<_> = app
        .sink
        .lines()
        .into_iter()
        .filter(|l| l.stream == Stream::Stderr && l.text.contains("\"level\":\"error\""))
        .collect();
    assert_eq!(error_lines.len(), 1);
}

#[tokio::test]
async fn test_runtime_failure_in_development_exposes_details() {
    let app = TestApp::new(FailingRepository, Environment::Development);

    let (status, body) = app
        .post_user(json!({"name": "John Doe", "email": "john@example.com"}))
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal server error");
    assert!(body["details"]["message"]
        .as_str()
        .unwrap()
        .contains("connection reset by peer"));
    assert!(body["details"]["stack"].is_string());
}

#[tokio::test]
async fn test_unknown_route_uses_envelope() {
    let app = TestApp::in_memory();

    let (status, body) = app.get("/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Cannot GET /api/nothing-here");
}

#[tokio::test]
async fn test_use_case_logs_flow_through_logger() {
    let app = TestApp::in_memory();
    let subscriber = tracing_subscriber::registry().with(LoggerLayer::new(app.logger.clone()));
    let _guard = tracing::subscriber::set_default(subscriber);

    let payload = json!({"name": "John Doe", "email": "john@example.com"});
    app.post_user(payload.clone()).await;
    app.post_user(payload).await;

    let use_case: Vec<Value> = app
        .sink
        .json_records()
        .into_iter()
        .filter(|r| r["context"] == "CreateUserUseCase")
        .collect();

    let messages: Vec<&str> = use_case
        .iter()
        .map(|r| r["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages[0], "Creating user with email: john@example.com");
    assert!(messages[1].starts_with("User created successfully with id: "));
    assert_eq!(messages[2], "Creating user with email: john@example.com");
    assert_eq!(messages[3], "User with email john@example.com already exists");
    assert_eq!(use_case[3]["level"], "warn");
}
