/// Database models and owner-scoped operations
///
/// - `user`: account identity, credentials, profile fields
/// - `task`: tasks and their completion/soft-delete lifecycle

pub mod task;
pub mod user;
