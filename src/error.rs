// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "error": true,
            "message": self.message(),
            "code": self.error_code()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert domain errors to ApiError
impl From<crate::services::admin::AdminError> for ApiError {
    fn from(err: crate::services::admin::AdminError) -> Self {
        use crate::services::admin::AdminError;
        match err {
            AdminError::NotFound => ApiError::not_found("User not found"),
            AdminError::ProtectedAccount => ApiError::forbidden(
                "The main admin account cannot be modified or deleted. This account has ultimate protection.",
            ),
            AdminError::ProtectedRole => {
                ApiError::forbidden("Cannot assign the main_admin role. This is a protected system role.")
            }
            AdminError::SelfAction => ApiError::bad_request("You cannot perform this action on yourself"),
            AdminError::InsufficientLevel { minimum } => {
                ApiError::forbidden(format!("Access denied. Minimum role required: {minimum}"))
            }
            AdminError::NotAboveTarget => {
                ApiError::forbidden("You cannot act on users at your level or higher")
            }
            AdminError::RoleNotPermitted(role) => {
                ApiError::forbidden(format!("You don't have permission to assign the {role} role"))
            }
            AdminError::CrossCollege => {
                ApiError::forbidden("Access denied. You can only manage users from your college.")
            }
            AdminError::MissingCollege => {
                ApiError::bad_request("Your account is missing college information")
            }
            AdminError::Conflict => ApiError::conflict("Target role changed during operation"),
            AdminError::Store(e) => e.into(),
        }
    }
}

impl From<crate::accounts::store::StoreError> for ApiError {
    fn from(err: crate::accounts::store::StoreError) -> Self {
        use crate::accounts::store::StoreError;
        match err {
            StoreError::NotFound => ApiError::not_found("User not found"),
            StoreError::Conflict => ApiError::conflict("Target role changed during operation"),
            StoreError::Unavailable(msg) => {
                tracing::error!("Account store unavailable: {}", msg);
                ApiError::service_unavailable("Account store temporarily unavailable")
            }
            StoreError::Sqlx(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", e);
                ApiError::service_unavailable("Account store temporarily unavailable")
            }
        }
    }
}

impl From<crate::auth::JwtError> for ApiError {
    fn from(err: crate::auth::JwtError) -> Self {
        tracing::error!("JWT error: {}", err);
        ApiError::internal_server_error("Failed to issue authentication token")
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
