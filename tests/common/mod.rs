#![allow(dead_code)]

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use taskguard::auth::{PasswordHasher, TokenService};
use taskguard::services::{AccountService, TaskService};
use taskguard::store::{InMemoryTaskStore, InMemoryUserStore};

pub const SECRET: &str = "integration-test-secret";

/// Shared app data backed by fresh in-memory stores.
#[derive(Clone)]
pub struct TestState {
    pub accounts: web::Data<AccountService>,
    pub tasks: web::Data<TaskService>,
    pub tokens: web::Data<TokenService>,
}

impl TestState {
    pub fn new() -> Self {
        let timeout = Duration::from_secs(2);
        let tokens = TokenService::new(SECRET, 1);
        let accounts = AccountService::new(
            Arc::new(InMemoryUserStore::new()),
            tokens.clone(),
            timeout,
        )
        .with_hasher(PasswordHasher::with_cost(4));

        Self {
            accounts: web::Data::new(accounts),
            tasks: web::Data::new(TaskService::new(Arc::new(InMemoryTaskStore::new()), timeout)),
            tokens: web::Data::new(tokens),
        }
    }
}

/// Builds the full application with the production route table.
macro_rules! test_app {
    ($state:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($state.accounts.clone())
                .app_data($state.tasks.clone())
                .app_data($state.tokens.clone())
                .wrap(actix_web::middleware::Logger::default())
                .configure(taskguard::routes::config),
        )
        .await
    };
}

pub async fn status_and_body<B: MessageBody>(resp: ServiceResponse<B>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = test::read_body(resp).await;
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        json!({ "raw": String::from_utf8_lossy(&bytes).to_string() })
    });
    (status, body)
}

pub async fn register<S, B>(app: &S, name: &str, email: &str, password: &str, role: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "name": name,
            "email": email,
            "password": password,
            "role": role
        }))
        .to_request();
    status_and_body(test::call_service(app, req).await).await
}

pub async fn login<S, B>(app: &S, email: &str, password: &str) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    status_and_body(test::call_service(app, req).await).await
}

/// Registers and logs in, returning the bearer token.
pub async fn token_for<S, B>(app: &S, name: &str, email: &str, role: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, body) = register(app, name, email, "secret1", role).await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    let (status, body) = login(app, email, "secret1").await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().expect("token in login response").to_string()
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}
