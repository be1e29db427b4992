/// Task endpoints
///
/// All routes here require a bearer token; the authenticated user id scopes
/// every store call, so a task that exists but belongs to someone else is
/// indistinguishable from one that does not exist.
///
/// # Endpoints
///
/// - `POST /api/tasks` - Create task
/// - `GET /api/tasks?status=active|completed|deleted` - List by filter
/// - `GET /api/tasks/:id` - Fetch a single visible task
/// - `PATCH /api/tasks/:id` - Edit title/description (and optionally
///   priority/deadline)
/// - `PATCH /api/tasks/complete/:id` / `incomplete/:id` - Toggle completion
/// - `PATCH /api/tasks/restore/:id` - Restore from trash
/// - `DELETE /api/tasks/:id` - Soft delete (move to trash)
/// - `DELETE /api/tasks/:id/permanent` - Purge, from any lifecycle state
///
/// Soft delete and purge are separate routes on purpose: which one the
/// client means is stated by the path, never inferred from which view
/// issued the call.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tasky_shared::{
    auth::middleware::AuthContext,
    models::task::{CreateTask, EditTask, StatusFilter, Task, TaskPriority},
};
use uuid::Uuid;
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Title (required, non-empty)
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Description (required, non-empty)
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Optional priority
    pub priority: Option<TaskPriority>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,
}

/// Edit task request
///
/// Same contract as creation: title and description are mandatory,
/// priority/deadline only change when supplied.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub priority: Option<TaskPriority>,

    pub deadline: Option<DateTime<Utc>>,
}

/// Listing query parameters
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Lifecycle filter; defaults to `active` when absent
    pub status: Option<String>,
}

/// Response carrying a task and a message
#[derive(Debug, Serialize)]
pub struct TaskEnvelope {
    pub message: String,
    pub task: Task,
}

/// Response carrying a single task
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: Task,
}

/// Response carrying a task list
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// Plain acknowledgment response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a new task
///
/// New tasks start active: not completed, not deleted.
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<TaskEnvelope>)> {
    req.validate()?;

    let task = Task::create(
        &state.db,
        CreateTask {
            owner_id: auth.user_id,
            title: req.title,
            description: req.description,
            priority: req.priority,
            deadline: req.deadline,
        },
    )
    .await?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task created");

    Ok((
        StatusCode::CREATED,
        Json(TaskEnvelope {
            message: "Task created successfully".to_string(),
            task,
        }),
    ))
}

/// List the authenticated user's tasks under a lifecycle filter
///
/// The three filters partition the owner's tasks; a missing `status`
/// parameter means `active`, an unrecognized one is a 400.
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = match query.status.as_deref() {
        None => StatusFilter::Active,
        Some(value) => StatusFilter::from_str(value).map_err(ApiError::BadRequest)?,
    };

    let tasks = Task::list_for_owner(&state.db, auth.user_id, filter).await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Fetch a single task (must be outside the trash)
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskResponse>> {
    let task = Task::find_visible(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskResponse { task }))
}

/// Edit a task's fields
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<TaskEnvelope>> {
    req.validate()?;

    let task = Task::edit(
        &state.db,
        id,
        auth.user_id,
        EditTask {
            title: req.title,
            description: req.description,
            priority: req.priority,
            deadline: req.deadline,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task updated");

    Ok(Json(TaskEnvelope {
        message: "Task updated successfully".to_string(),
        task,
    }))
}

/// Mark a task complete
pub async fn complete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = Task::set_completed(&state.db, id, auth.user_id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task marked complete");

    Ok(Json(TaskEnvelope {
        message: "Task marked as complete".to_string(),
        task,
    }))
}

/// Mark a task incomplete
pub async fn incomplete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = Task::set_completed(&state.db, id, auth.user_id, false)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task marked incomplete");

    Ok(Json(TaskEnvelope {
        message: "Task marked as incomplete".to_string(),
        task,
    }))
}

/// Restore a task from the trash
///
/// Only tasks currently in the trash match; the completion flag comes back
/// exactly as it was before deletion.
pub async fn restore_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskEnvelope>> {
    let task = Task::restore(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found in trash".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %task.id, "Task restored");

    Ok(Json(TaskEnvelope {
        message: "Task restored successfully".to_string(),
        task,
    }))
}

/// Soft-delete a task (move to trash)
pub async fn soft_delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    Task::soft_delete(&state.db, id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    tracing::info!(user_id = %auth.user_id, task_id = %id, "Task moved to trash");

    Ok(Json(MessageResponse {
        message: "Task deleted successfully".to_string(),
    }))
}

/// Permanently delete a task
///
/// Erases the row from any lifecycle state; there is no undo.
pub async fn purge_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let deleted = Task::delete_permanent(&state.db, id, auth.user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Task not found".to_string()));
    }

    tracing::info!(user_id = %auth.user_id, task_id = %id, "Task permanently deleted");

    Ok(Json(MessageResponse {
        message: "Task permanently deleted".to_string(),
    }))
}
