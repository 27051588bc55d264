use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use campus_api::accounts::memory::MemoryAccountStore;
use campus_api::accounts::Account;
use campus_api::auth::{generate_jwt, hash_password, Claims};
use campus_api::handlers::{router, AppState};
use campus_api::roles::Role;

/// Router backed by an in-memory store pre-loaded with `accounts`.
pub async fn app_with(accounts: Vec<Account>) -> Router {
    let store = Arc::new(MemoryAccountStore::with_accounts(accounts).await);
    router(AppState::new(store))
}

pub fn account(email: &str, role: Role) -> Account {
    let mut account = Account::register(email, "Test User", hash_password("hunter2"));
    account.role = role;
    account
}

pub fn token_for(account: &Account) -> String {
    generate_jwt(Claims::new(account.id, account.email.clone())).expect("jwt")
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))?,
        None => builder.body(Body::empty())?,
    };

    let response: Response<Body> = app.clone().oneshot(request).await?;
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}
