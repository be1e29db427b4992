/// Authentication module
///
/// Everything needed to authenticate Tasky users:
///
/// - `jwt`: Stateless bearer token creation and validation (HS256, 7 days)
/// - `password`: Argon2id password hashing and verification
/// - `middleware`: Axum middleware that turns a bearer token into an
///   `AuthContext` on the request

pub mod jwt;
pub mod middleware;
pub mod password;
