pub mod admin;
pub mod auth;

use axum::routing::{delete, get, post};
use axum::{Extension, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::accounts::store::AccountStore;
use crate::accounts::Account;
use crate::error::ApiError;
use crate::middleware::auth::{jwt_auth_middleware, AuthUser};
use crate::services::admin::AdminService;

/// Shared handler state: the account store plus the admin engine built on
/// top of it.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AccountStore>,
    pub admin: Arc<AdminService>,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        let admin = Arc::new(AdminService::new(store.clone()));
        Self { store, admin }
    }
}

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        // Protected API
        .merge(protected_routes())
        // Global middleware
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn protected_routes() -> Router {
    Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/admin/users", get(admin::list_users))
        .route("/api/admin/users/:user_id/promote", post(admin::promote))
        .route("/api/admin/users/:user_id/demote", post(admin::demote))
        .route("/api/admin/users/:user_id", delete(admin::delete_user))
        .route("/api/admin/my-permissions", get(admin::my_permissions))
        .route("/api/admin/stats/college", get(admin::college_stats))
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

/// Load the acting account fresh from the store. The token only proves
/// identity; role and college always come from the current record.
pub(crate) async fn load_actor(
    state: &AppState,
    auth_user: &AuthUser,
) -> Result<Account, ApiError> {
    state
        .store
        .find_by_id(auth_user.user_id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))
}

async fn root() -> axum::response::Json<serde_json::Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(serde_json::json!({
        "success": true,
        "data": {
            "name": "Campus API",
            "version": version,
            "description": "Campus community backend built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public)",
                "me": "/api/auth/me (protected)",
                "admin": "/api/admin/* (protected, role-gated)",
            }
        }
    }))
}

async fn health(Extension(state): Extension<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.ping().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(serde_json::json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(serde_json::json!({
                "success": false,
                "error": "account store unavailable",
                "data": { "status": "degraded", "timestamp": now, "store_error": e.to_string() }
            })),
        ),
    }
}
