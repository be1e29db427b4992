/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Create a new account
/// - `POST /api/auth/login` - Verify credentials and issue a bearer token
/// - `PATCH /api/auth/password` - Change password (authenticated)
/// - `POST /api/auth/logout` - Stateless acknowledgment (authenticated)
///
/// Login accepts either username or email as the identifier and returns
/// the same "Invalid credentials" 401 for an unknown identifier and a
/// wrong password, so responses cannot be used to enumerate accounts.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use tasky_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, PublicUser, User},
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    /// First name
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    /// Last name
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    /// Username (unique)
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Email address (unique)
    #[validate(email(message = "Valid email is required"))]
    pub email_address: String,

    /// Password (plaintext over TLS, hashed before storage)
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username or email address
    #[validate(length(min = 1, message = "Email or username is required"))]
    pub identifier: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before the change applies
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    /// New password
    #[validate(length(min = 6, message = "Your new password must be at least 6 characters"))]
    pub new_password: String,
}

/// Response carrying a user
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: String,
    pub user: PublicUser,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    /// Signed bearer token, valid for 7 days
    pub token: String,
    pub user: PublicUser,
}

/// Plain acknowledgment response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new user
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or username/email already taken
/// - `500 Internal Server Error`: hashing or database failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserEnvelope>)> {
    req.validate()?;

    let taken = User::identifier_taken(
        &state.db,
        Some(&req.username),
        Some(&req.email_address),
        None,
    )
    .await?;
    if taken {
        return Err(ApiError::Duplicate(
            "User with this email or username already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            email_address: req.email_address,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            message: "User registered successfully".to_string(),
            user: user.into(),
        }),
    ))
}

/// Login with username or email
///
/// An unknown identifier and a wrong password produce byte-identical
/// responses.
///
/// # Errors
///
/// - `400 Bad Request`: validation failed
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_identifier(&state.db, &req.identifier)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    let claims = jwt::Claims::new(user.id);
    let token = jwt::create_token(&claims, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: user.into(),
    }))
}

/// Change the authenticated user's password
///
/// # Errors
///
/// - `400 Bad Request`: validation failed, or current password is wrong
/// - `404 Not Found`: account no longer exists
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let valid = password::verify_password(&req.current_password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    let new_hash = password::hash_password(&req.new_password)?;
    let updated = User::update_password(&state.db, auth.user_id, &new_hash).await?;
    if !updated {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, "Password updated");

    Ok(Json(MessageResponse {
        message: "Password updated successfully".to_string(),
    }))
}

/// Logout acknowledgment
///
/// Sessions are stateless bearer tokens, so there is nothing to revoke
/// server-side; the client discards its token.
pub async fn logout(Extension(auth): Extension<AuthContext>) -> Json<MessageResponse> {
    tracing::debug!(user_id = %auth.user_id, "User logged out");

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            username: "ada".to_string(),
            email_address: "ada@example.com".to_string(),
            password: "secret123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = RegisterRequest {
            first_name: "".to_string(),
            ..valid_clone(&valid)
        };
        assert!(empty_name.validate().is_err());

        let bad_email = RegisterRequest {
            email_address: "not-an-email".to_string(),
            ..valid_clone(&valid)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "12345".to_string(),
            ..valid_clone(&valid)
        };
        assert!(short_password.validate().is_err());
    }

    fn valid_clone(req: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            first_name: req.first_name.clone(),
            last_name: req.last_name.clone(),
            username: req.username.clone(),
            email_address: req.email_address.clone(),
            password: req.password.clone(),
        }
    }

    #[test]
    fn test_login_request_validation() {
        let valid = LoginRequest {
            identifier: "ada".to_string(),
            password: "secret123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty = LoginRequest {
            identifier: "".to_string(),
            password: "".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_change_password_request_validation() {
        let short = ChangePasswordRequest {
            current_password: "oldpassword".to_string(),
            new_password: "12345".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = ChangePasswordRequest {
            current_password: "oldpassword".to_string(),
            new_password: "123456".to_string(),
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_register_request_uses_camel_case() {
        let json = serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "username": "ada",
            "emailAddress": "ada@example.com",
            "password": "secret123"
        });

        let req: RegisterRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.first_name, "Ada");
        assert_eq!(req.email_address, "ada@example.com");
    }
}
