/// Error handling for the API server
///
/// A unified error type that maps the domain's failure modes to HTTP
/// responses. All handlers return `Result<T, ApiError>`, which converts
/// into the standard `{message, errors?}` JSON body.
///
/// The taxonomy:
///
/// - `Validation` / `BadRequest` / `Duplicate` -> 400
/// - `Unauthorized` -> 401 (bad credentials, missing/invalid/expired token)
/// - `NotFound` -> 404, deliberately conflating "does not exist", "not
///   owned by the requester", and "wrong lifecycle state" so responses
///   leak no existence information
/// - `Upstream` -> 502 (asset host failure during an avatar upload)
/// - `Internal` -> 500, detail logged server-side and redacted from the
///   response in release builds

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Malformed input outside field validation (400)
    BadRequest(String),

    /// Field-level validation failures (400)
    Validation(Vec<FieldError>),

    /// Unique constraint collision, e.g. username/email taken (400)
    Duplicate(String),

    /// Bad credentials or invalid token (401)
    Unauthorized(String),

    /// Entity absent, foreign-owned, or in the wrong lifecycle state (404)
    NotFound(String),

    /// Asset host failure during upload (502)
    Upstream(String),

    /// Unexpected failure (500)
    Internal(String),
}

/// A single field validation failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response body: `{message, errors?}`
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable error message
    pub message: String,

    /// Per-field validation details, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Validation(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Duplicate(msg) => write!(f, "Duplicate: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Upstream(msg) => write!(f, "Upstream failure: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::Duplicate(msg) => (StatusCode::BAD_REQUEST, msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),
            ApiError::Upstream(msg) => {
                tracing::error!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg, None)
            }
            ApiError::Internal(msg) => {
                // Full detail goes to the log; clients get the redacted
                // message except in debug builds
                tracing::error!("Internal error: {}", msg);
                let message = if cfg!(debug_assertions) {
                    msg
                } else {
                    "Internal Server Error".to_string()
                };
                (StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
        };

        let body = Json(ErrorBody { message, errors });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique constraint violations become `Duplicate` so a race that slips
/// past the pre-check still produces a 400 rather than a 500.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if db_err.code().as_deref() == Some("23505") {
                    return ApiError::Duplicate(
                        "A record with this information already exists".to_string(),
                    );
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert request validation failures into per-field details
impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        let errors: Vec<FieldError> = err
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        ApiError::Validation(errors)
    }
}

/// Convert JWT errors to API errors
impl From<tasky_shared::auth::jwt::JwtError> for ApiError {
    fn from(err: tasky_shared::auth::jwt::JwtError) -> Self {
        match err {
            tasky_shared::auth::jwt::JwtError::Expired => {
                ApiError::Unauthorized("Token expired".to_string())
            }
            tasky_shared::auth::jwt::JwtError::InvalidIssuer => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            tasky_shared::auth::jwt::JwtError::CreateError(msg) => {
                ApiError::Internal(format!("Token creation failed: {}", msg))
            }
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert password hashing errors to API errors
///
/// Hashing failures are infrastructure problems, never user input problems.
impl From<tasky_shared::auth::password::PasswordError> for ApiError {
    fn from(err: tasky_shared::auth::password::PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert asset host errors to API errors
///
/// Used on the upload path, where an asset host failure is fatal. Deletes
/// are best-effort and handled (logged) at the call site instead.
impl From<crate::assets::AssetStoreError> for ApiError {
    fn from(err: crate::assets::AssetStoreError) -> Self {
        ApiError::Upstream(format!("Asset host request failed: {}", err))
    }
}
