//! HTTP surface for the role administration engine. Handlers load the
//! actor's current account, hand it to the service explicitly, and map
//! domain errors onto the API taxonomy. All authorization decisions live
//! in the service layer, not here.

use axum::extract::Path;
use axum::{Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{load_actor, AppState};
use crate::accounts::AccountSummary;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::roles::Role;
use crate::services::admin::{CollegeStats, PermissionView};
use crate::services::guard;

#[derive(Debug, Deserialize)]
pub struct RoleChangeRequest {
    pub target_role: Role,
}

/// GET /api/admin/users - the actor's manageable-users view. The route is
/// gated at college_management even though the view itself would simply be
/// empty for lower roles.
pub async fn list_users(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<Vec<AccountSummary>>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    guard::require_min_role(&actor, Role::CollegeManagement)?;
    let users = state.admin.list_manageable_users(&actor).await?;
    Ok(Json(users))
}

/// POST /api/admin/users/:user_id/promote
pub async fn promote(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleChangeRequest>,
) -> Result<Json<Value>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    let user = state
        .admin
        .promote(&actor, user_id, payload.target_role)
        .await?;

    Ok(Json(json!({
        "message": format!("User {} promoted to {}", user.full_name, user.role),
        "user": user
    })))
}

/// POST /api/admin/users/:user_id/demote
pub async fn demote(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<RoleChangeRequest>,
) -> Result<Json<Value>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    let user = state
        .admin
        .demote(&actor, user_id, payload.target_role)
        .await?;

    Ok(Json(json!({
        "message": format!("User {} demoted to {}", user.full_name, user.role),
        "user": user
    })))
}

/// DELETE /api/admin/users/:user_id
pub async fn delete_user(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    let user = state.admin.delete_account(&actor, user_id).await?;

    Ok(Json(json!({
        "message": format!(
            "User {} ({}) has been deleted successfully",
            user.full_name, user.email
        )
    })))
}

/// GET /api/admin/my-permissions - display-only capability tags.
pub async fn my_permissions(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<PermissionView>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    Ok(Json(state.admin.get_permissions(&actor)))
}

/// GET /api/admin/stats/college - per-role counts in the actor's scope.
pub async fn college_stats(
    Extension(state): Extension<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<CollegeStats>, ApiError> {
    let actor = load_actor(&state, &auth_user).await?;
    let stats = state.admin.college_stats(&actor).await?;
    Ok(Json(stats))
}
