use axum::{http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{load_actor, AppState};
use crate::accounts::{Account, AccountSummary};
use crate::auth::{generate_jwt, hash_password, verify_password, Claims};
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub interests: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/register - create an account with the student role.
///
/// The college affiliation is derived from the email domain exactly once,
/// here. Promotion to any higher role goes through the admin engine.
pub async fn register(
    Extension(state): Extension<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !payload.email.contains('@') {
        return Err(ApiError::bad_request("Valid email required"));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }
    if payload.full_name.trim().len() < 2 {
        return Err(ApiError::bad_request(
            "Full name must be at least 2 characters",
        ));
    }

    if state.store.find_by_email(&payload.email).await?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let mut account = Account::register(
        &payload.email,
        payload.full_name.trim(),
        hash_password(&payload.password),
    );
    if let Some(bio) = payload.bio {
        account.bio = bio;
    }
    if let Some(interests) = payload.interests {
        account.interests = interests;
    }

    state.store.insert(&account).await?;
    tracing::info!(
        "Registered {} (college: {})",
        account.email,
        account.college_id.as_deref().unwrap_or("no affiliation")
    );

    let token = generate_jwt(Claims::new(account.id, account.email.clone()))?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": account.summary() })),
    ))
}

/// POST /auth/login - authenticate and receive a JWT.
pub async fn login(
    Extension(state): Extension<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let account = state
        .store
        .find_by_email(&payload.email)
        .await?
        .filter(|a| verify_password(&payload.password, &a.hashed_password))
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    let token = generate_jwt(Claims::new(account.id, account.email.clone()))?;
    Ok(Json(json!({ "token": token, "user": account.summary() })))
}

/// GET /api/auth/me - current account, fresh from the store.
pub async fn me(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<AccountSummary>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    Ok(Json(actor.summary()))
}
