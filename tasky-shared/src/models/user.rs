/// User model and database operations
///
/// The credential store: persists user identity and the password hash, and
/// enforces uniqueness of username and email address. Soft-deleted users are
/// excluded from every lookup; nothing in scope hard-deletes a user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email_address VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     avatar_url VARCHAR(512),
///     date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_profile_update TIMESTAMPTZ,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use tasky_shared::models::user::{CreateUser, User};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         first_name: "Ada".to_string(),
///         last_name: "Lovelace".to_string(),
///         username: "ada".to_string(),
///         email_address: "ada@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_identifier(&pool, "ada").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, first_name, last_name, username, email_address, password_hash, \
                            avatar_url, date_joined, last_profile_update, is_deleted";

/// User model representing an account
///
/// Deliberately does NOT implement `Serialize`: the password hash must never
/// reach a response body. Convert to [`PublicUser`] for anything that leaves
/// the process.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// First name
    pub first_name: String,

    /// Last name
    pub last_name: String,

    /// Username, unique across non-deleted users (case-sensitive)
    pub username: String,

    /// Email address, unique across non-deleted users (case-sensitive)
    pub email_address: String,

    /// Argon2id password hash, never plaintext
    pub password_hash: String,

    /// Hosted avatar URL (None until one is uploaded)
    pub avatar_url: Option<String>,

    /// When the account was created
    pub date_joined: DateTime<Utc>,

    /// When profile fields were last changed (None if never)
    pub last_profile_update: Option<DateTime<Utc>>,

    /// Soft-delete flag; excluded from all lookups when set
    pub is_deleted: bool,
}

/// Public view of a user, safe to serialize into responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    /// Hosted avatar URL, empty string when unset
    pub avatar: String,
    pub date_joined: DateTime<Utc>,
    pub last_profile_update: Option<DateTime<Utc>>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email_address: user.email_address,
            avatar: user.avatar_url.unwrap_or_default(),
            date_joined: user.date_joined,
            last_profile_update: user.last_profile_update,
        }
    }
}

/// Input for creating a new user
///
/// All fields are required; the password arrives pre-hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email_address: String,
    pub password_hash: String,
}

/// Input for a partial profile update
///
/// Only non-None fields are applied. `last_profile_update` is stamped
/// regardless of which fields changed.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email_address: Option<String>,
}

impl UpdateProfile {
    /// True when no field was supplied
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.username.is_none()
            && self.email_address.is_none()
    }
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error if the username or email collides with an
    /// existing row (unique constraint violation) or the connection fails.
    /// Callers should pre-check with [`User::identifier_taken`] for a clean
    /// duplicate message; the constraint remains the backstop under races.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (first_name, last_name, username, email_address, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.username)
        .bind(data.email_address)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID, excluding soft-deleted accounts
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username OR email address
    ///
    /// This is the login lookup; soft-deleted accounts never match.
    pub async fn find_by_identifier(
        pool: &PgPool,
        identifier: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE (username = $1 OR email_address = $1) AND is_deleted = FALSE
            "#,
        ))
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Checks whether a username or email is already claimed
    ///
    /// Either identifier may be None (then it does not participate in the
    /// check). `exclude` skips one user id, so a profile update does not
    /// collide with the caller's own row.
    pub async fn identifier_taken(
        pool: &PgPool,
        username: Option<&str>,
        email_address: Option<&str>,
        exclude: Option<Uuid>,
    ) -> Result<bool, sqlx::Error> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE (username = $1 OR email_address = $2)
                  AND ($3::uuid IS NULL OR id <> $3::uuid)
                  AND is_deleted = FALSE
            )
            "#,
        )
        .bind(username)
        .bind(email_address)
        .bind(exclude)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Replaces the stored password hash
    ///
    /// Current-password verification and new-password policy are the
    /// caller's responsibility; this only persists the new hash.
    ///
    /// # Returns
    ///
    /// True if the user existed and was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: Uuid,
        new_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE id = $1 AND is_deleted = FALSE
            "#,
        )
        .bind(id)
        .bind(new_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Applies a partial profile update
    ///
    /// Only supplied fields are written; `last_profile_update` is always
    /// stamped. Collision checks against other users belong to the caller
    /// (see [`User::identifier_taken`]), with the unique constraints as the
    /// backstop.
    ///
    /// # Returns
    ///
    /// The updated user, or None if the user does not exist (or is
    /// soft-deleted).
    pub async fn update_profile(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build the SET list dynamically from the supplied fields
        let mut query = String::from("UPDATE users SET last_profile_update = NOW()");
        let mut bind_count = 1;

        if data.first_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", first_name = ${}", bind_count));
        }
        if data.last_name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", last_name = ${}", bind_count));
        }
        if data.username.is_some() {
            bind_count += 1;
            query.push_str(&format!(", username = ${}", bind_count));
        }
        if data.email_address.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email_address = ${}", bind_count));
        }

        query.push_str(&format!(
            " WHERE id = $1 AND is_deleted = FALSE RETURNING {USER_COLUMNS}"
        ));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(first_name) = data.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = data.last_name {
            q = q.bind(last_name);
        }
        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email_address) = data.email_address {
            q = q.bind(email_address);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Sets or clears the avatar URL
    ///
    /// Also stamps `last_profile_update`, since the avatar is a profile
    /// attribute.
    pub async fn set_avatar(
        pool: &PgPool,
        id: Uuid,
        avatar_url: Option<String>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET avatar_url = $2,
                last_profile_update = NOW()
            WHERE id = $1 AND is_deleted = FALSE
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(avatar_url)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            username: "testuser".to_string(),
            email_address: "test@example.com".to_string(),
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$secret".to_string(),
            avatar_url: None,
            date_joined: Utc::now(),
            last_profile_update: None,
            is_deleted: false,
        }
    }

    #[test]
    fn test_public_user_never_exposes_hash() {
        let user = sample_user();
        let hash = user.password_hash.clone();

        let public: PublicUser = user.into();
        let json = serde_json::to_string(&public).unwrap();

        assert!(!json.contains("password"));
        assert!(!json.contains(&hash));
    }

    #[test]
    fn test_public_user_field_names() {
        let public: PublicUser = sample_user().into();
        let json = serde_json::to_value(&public).unwrap();

        assert!(json.get("firstName").is_some());
        assert!(json.get("lastName").is_some());
        assert!(json.get("emailAddress").is_some());
        assert!(json.get("dateJoined").is_some());
        assert_eq!(json["avatar"], "");
    }

    #[test]
    fn test_public_user_avatar_defaults_to_empty() {
        let mut user = sample_user();
        user.avatar_url = Some("https://assets.example.com/abc123.png".to_string());

        let public: PublicUser = user.into();
        assert_eq!(public.avatar, "https://assets.example.com/abc123.png");

        let public: PublicUser = sample_user().into();
        assert_eq!(public.avatar, "");
    }

    #[test]
    fn test_update_profile_is_empty() {
        assert!(UpdateProfile::default().is_empty());

        let update = UpdateProfile {
            username: Some("newname".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    // Database-backed tests live in tasky-api/tests/.
}
