/// Profile and avatar endpoints
///
/// # Endpoints
///
/// - `GET /api/user` - Current user's profile
/// - `PATCH /api/user` - Partial profile update
/// - `POST /api/user/avatar` - Multipart image upload, ≤ 5 MiB
/// - `DELETE /api/user/avatar` - Remove the avatar
///
/// Avatar binaries live on an external asset host; the user record stores
/// only the hosted URL. Replacing or removing an avatar deletes the old
/// asset best-effort: a failed remote delete is logged and the profile
/// update proceeds, accepting the orphaned asset as a resource leak.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, FieldError},
};
use axum::{
    extract::{Multipart, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use tasky_shared::{
    auth::middleware::AuthContext,
    models::user::{PublicUser, UpdateProfile, User},
};
use validator::Validate;

/// Maximum accepted avatar size
const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

/// Accepted avatar content types
const ALLOWED_IMAGE_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Profile update request; all fields optional, supplied ones must be valid
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, message = "First name cannot be empty"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, message = "Last name cannot be empty"))]
    pub last_name: Option<String>,

    #[validate(length(min = 1, message = "Username cannot be empty"))]
    pub username: Option<String>,

    #[validate(email(message = "Valid email is required"))]
    pub email_address: Option<String>,
}

/// Response carrying the user
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: PublicUser,
}

/// Response carrying the user and a message
#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub message: String,
    pub user: PublicUser,
}

/// Fetch the authenticated user's profile
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserResponse { user: user.into() }))
}

/// Apply a partial profile update
///
/// Supplied username/email values are checked against every other user
/// before the update; `lastProfileUpdate` is stamped even for an empty
/// update.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserEnvelope>> {
    req.validate()?;

    if req.username.is_some() || req.email_address.is_some() {
        let taken = User::identifier_taken(
            &state.db,
            req.username.as_deref(),
            req.email_address.as_deref(),
            Some(auth.user_id),
        )
        .await?;
        if taken {
            return Err(ApiError::Duplicate(
                "Username or email already exists".to_string(),
            ));
        }
    }

    let user = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            first_name: req.first_name,
            last_name: req.last_name,
            username: req.username,
            email_address: req.email_address,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Profile updated");

    Ok(Json(UserEnvelope {
        message: "Profile updated successfully".to_string(),
        user: user.into(),
    }))
}

/// Upload a new avatar
///
/// Reads the `avatar` field from the multipart body, validates content
/// type and size before any upstream call, best-effort deletes the
/// previous asset, uploads the new one, and stores the returned URL.
///
/// # Errors
///
/// - `400 Bad Request`: no file, non-image content type, or over 5 MiB
///   (nothing changes on the user record in any of these cases)
/// - `502 Bad Gateway`: asset host rejected the upload
pub async fn upload_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<Json<UserEnvelope>> {
    let mut upload: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart body".to_string()))?
    {
        if field.name() != Some("avatar") {
            continue;
        }

        let content_type = field
            .content_type()
            .map(str::to_string)
            .filter(|ct| ALLOWED_IMAGE_TYPES.contains(&ct.as_str()))
            .ok_or_else(|| {
                ApiError::Validation(vec![FieldError {
                    field: "avatar".to_string(),
                    message: "Only image files are allowed".to_string(),
                }])
            })?;

        let bytes = field
            .bytes()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read uploaded file".to_string()))?;

        if bytes.len() > MAX_AVATAR_BYTES {
            return Err(ApiError::Validation(vec![FieldError {
                field: "avatar".to_string(),
                message: "Avatar must be at most 5MB".to_string(),
            }]));
        }

        upload = Some((bytes.to_vec(), content_type));
        break;
    }

    let (bytes, content_type) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    delete_existing_asset(&state, &user).await;

    // Fatal from here: a rejected upload fails the whole request
    let avatar_url = state.assets.upload(bytes, &content_type).await?;

    let user = User::set_avatar(&state.db, auth.user_id, Some(avatar_url))
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Avatar uploaded");

    Ok(Json(UserEnvelope {
        message: "Avatar uploaded successfully".to_string(),
        user: user.into(),
    }))
}

/// Remove the current avatar
///
/// The URL is cleared regardless of whether the remote delete succeeded.
pub async fn remove_avatar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserEnvelope>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    delete_existing_asset(&state, &user).await;

    let user = User::set_avatar(&state.db, auth.user_id, None)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, "Avatar removed");

    Ok(Json(UserEnvelope {
        message: "Avatar removed successfully".to_string(),
        user: user.into(),
    }))
}

/// Best-effort delete of the user's current avatar asset, if any
///
/// A failure here is logged and swallowed; the caller proceeds either way.
async fn delete_existing_asset(state: &AppState, user: &User) {
    let Some(url) = user.avatar_url.as_deref().filter(|u| !u.is_empty()) else {
        return;
    };

    let Some(asset_id) = crate::assets::AssetStore::asset_id(url) else {
        tracing::warn!(user_id = %user.id, url, "Could not derive asset id from avatar URL");
        return;
    };

    if let Err(e) = state.assets.delete(asset_id).await {
        tracing::warn!(user_id = %user.id, asset_id, error = %e, "Failed to delete old avatar asset");
    }
}
