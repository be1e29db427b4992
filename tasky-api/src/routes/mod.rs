/// API route handlers, organized by resource
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, password change, logout
/// - `tasks`: Task CRUD and lifecycle transitions
/// - `user`: Profile and avatar management

pub mod auth;
pub mod health;
pub mod tasks;
pub mod user;

use axum::{http::StatusCode, Json};
use serde_json::json;

/// Fallback for unknown routes
pub async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "Welcome to the tasky api" })),
    )
}
