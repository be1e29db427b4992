/// Application state and router builder
///
/// Defines the shared application state and assembles the Axum router with
/// all routes and middleware.
///
/// # Route Tree
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST  /register        # Create account (public)
///     │   ├── POST  /login           # Issue bearer token (public)
///     │   ├── PATCH /password        # Change password (auth)
///     │   └── POST  /logout          # Stateless acknowledgment (auth)
///     ├── /tasks/                    # All task routes require auth
///     │   ├── POST   /               # Create task
///     │   ├── GET    /?status=...    # List by lifecycle filter
///     │   ├── GET    /:id
///     │   ├── PATCH  /:id            # Edit
///     │   ├── DELETE /:id            # Soft delete (to trash)
///     │   ├── DELETE /:id/permanent  # Purge (from any state)
///     │   ├── PATCH  /complete/:id
///     │   ├── PATCH  /incomplete/:id
///     │   └── PATCH  /restore/:id
///     └── /user/                     # All profile routes require auth
///         ├── GET    /
///         ├── PATCH  /
///         ├── POST   /avatar         # Multipart upload, ≤ 5 MiB image
///         └── DELETE /avatar
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first): security headers, CORS, request
/// tracing. Bearer authentication is layered per-router on the protected
/// subtrees.

use crate::{assets::AssetStore, config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasky_shared::auth::middleware::create_bearer_auth;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Request body ceiling for avatar uploads
///
/// Set above the 5 MiB avatar limit so oversized-but-plausible uploads
/// reach the explicit size check and get a proper validation error instead
/// of a generic body-limit rejection.
const AVATAR_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state
///
/// Cloned into each request handler via Axum's `State` extractor; all
/// members are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// External asset host client
    pub assets: AssetStore,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let assets = AssetStore::new(&config.assets);
        Self {
            db,
            config: Arc::new(config),
            assets,
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let bearer_auth = axum::middleware::from_fn(create_bearer_auth(state.jwt_secret().to_string()));

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes: register/login are public, the rest require a token
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/password", patch(routes::auth::change_password))
                .route("/logout", post(routes::auth::logout))
                .layer(bearer_auth.clone()),
        );

    // Task routes (all authenticated)
    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::soft_delete_task),
        )
        .route("/:id/permanent", delete(routes::tasks::purge_task))
        .route("/complete/:id", patch(routes::tasks::complete_task))
        .route("/incomplete/:id", patch(routes::tasks::incomplete_task))
        .route("/restore/:id", patch(routes::tasks::restore_task))
        .layer(bearer_auth.clone());

    // Profile routes (all authenticated); raised body limit for the avatar
    let user_routes = Router::new()
        .route(
            "/",
            get(routes::user::get_user).patch(routes::user::update_profile),
        )
        .route(
            "/avatar",
            post(routes::user::upload_avatar).delete(routes::user::remove_avatar),
        )
        .layer(DefaultBodyLimit::max(AVATAR_BODY_LIMIT))
        .layer(bearer_auth);

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/user", user_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .fallback(routes::not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
