/// Middleware modules for the API server
///
/// Bearer-token authentication lives in `tasky_shared::auth::middleware`;
/// only HTTP-surface middleware is defined here.

pub mod security;
