#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use bookstore::bookstore_auth::TokenService;
use bookstore::bookstore_config::{CorsConfig, JwtConfig};
use bookstore::bookstore_core::hash_password;
use bookstore::bookstore_models::{BookId, NewUser, Role};
use bookstore::router::init_router;
use bookstore::state::AppState;
use bookstore::store::{InventoryLedger, MemoryStore, UserDirectory};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub tokens: TokenService,
}

pub fn test_tokens() -> TokenService {
    TokenService::new(&JwtConfig::new(TEST_SECRET.to_string(), 3600))
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let tokens = test_tokens();
    let state = AppState::from_store(
        store.clone(),
        tokens.clone(),
        CorsConfig::parse("http://localhost:4200"),
        None,
    );

    TestApp {
        router: init_router(state),
        store,
        tokens,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    /// Inserts a user directly and returns a token for it.
    pub async fn user_with_role(&self, username: &str, role: Role) -> String {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: hash_password(PASSWORD).unwrap(),
                address: "1 Test Lane".to_string(),
                age: 30,
                customer_id: format!("CUST-{username}"),
                role,
            })
            .await
            .unwrap();
        self.tokens.issue(username).unwrap()
    }

    pub async fn customer(&self, username: &str) -> String {
        self.user_with_role(username, Role::Customer).await
    }

    pub async fn admin(&self, username: &str) -> String {
        self.user_with_role(username, Role::Admin).await
    }

    pub async fn book(&self, title: &str, price: &str, stock: i32) -> BookId {
        self.store
            .add_book(title, price.parse::<Decimal>().unwrap(), stock)
            .await
    }

    pub async fn stock_of(&self, book: BookId) -> i32 {
        self.store.get(book).await.unwrap().unwrap().quantity_available
    }
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn order_body(lines: &[(BookId, i32)]) -> Value {
    json!({
        "items": lines
            .iter()
            .map(|(book, qty)| json!({ "bookId": book.into_inner(), "quantity": qty }))
            .collect::<Vec<_>>(),
        "shippingAddress": "221B Baker Street",
    })
}
