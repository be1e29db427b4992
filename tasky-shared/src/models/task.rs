/// Task model and lifecycle operations
///
/// Tasks are the core entity of Tasky. Each task belongs to exactly one
/// owner and carries two independent lifecycle flags: `is_completed` and
/// `is_deleted` (soft delete).
///
/// # State Machine
///
/// ```text
/// created (active) ⇄ completed          (toggle while not deleted)
///        │                │
///        └── soft delete ─┴→ trash ── restore ──→ back, completion preserved
///                              │
///                              └── permanent delete → row erased
/// ```
///
/// Every operation takes the requesting owner's id and encodes ownership
/// plus the lifecycle precondition in the SQL WHERE clause, which Postgres
/// evaluates atomically. A transition whose precondition does not hold
/// matches zero rows and comes back as `None`; callers surface that as
/// "not found" without distinguishing absent, foreign-owned, and
/// wrong-state tasks.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_priority AS ENUM ('important', 'urgent', 'very_urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL,
///     priority task_priority,
///     deadline TIMESTAMPTZ,
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     is_deleted BOOLEAN NOT NULL DEFAULT FALSE,
///     date_created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     date_updated TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

const TASK_COLUMNS: &str = "id, owner_id, title, description, priority, deadline, \
                            is_completed, is_deleted, date_created, date_updated";

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskPriority {
    Important,
    Urgent,
    VeryUrgent,
}

impl TaskPriority {
    /// Priority as its database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Important => "important",
            TaskPriority::Urgent => "urgent",
            TaskPriority::VeryUrgent => "very_urgent",
        }
    }
}

/// Listing filter over the two lifecycle flags
///
/// The three filters partition an owner's tasks: every task matches exactly
/// one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Not deleted, not completed
    Active,

    /// Not deleted, completed
    Completed,

    /// In trash (completion state irrelevant)
    Deleted,
}

impl StatusFilter {
    /// Filter name as used in the `status` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
            StatusFilter::Deleted => "deleted",
        }
    }

    /// SQL predicate implementing this filter
    ///
    /// Combined with the owner check in [`Task::list_for_owner`].
    pub fn sql_predicate(&self) -> &'static str {
        match self {
            StatusFilter::Active => "is_deleted = FALSE AND is_completed = FALSE",
            StatusFilter::Completed => "is_deleted = FALSE AND is_completed = TRUE",
            StatusFilter::Deleted => "is_deleted = TRUE",
        }
    }

    /// The same predicate over in-memory flags
    pub fn matches(&self, is_completed: bool, is_deleted: bool) -> bool {
        match self {
            StatusFilter::Active => !is_deleted && !is_completed,
            StatusFilter::Completed => !is_deleted && is_completed,
            StatusFilter::Deleted => is_deleted,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            "deleted" => Ok(StatusFilter::Deleted),
            other => Err(format!(
                "Invalid status filter '{}', expected active, completed, or deleted",
                other
            )),
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner; the only user who can see or mutate this task
    pub owner_id: Uuid,

    /// Short title
    pub title: String,

    /// Longer free-form description
    pub description: String,

    /// Optional priority
    pub priority: Option<TaskPriority>,

    /// Optional deadline
    pub deadline: Option<DateTime<Utc>>,

    /// Completion flag, toggled freely while the task is not deleted
    pub is_completed: bool,

    /// Soft-delete flag, independent of completion
    pub is_deleted: bool,

    /// When the task was created
    pub date_created: DateTime<Utc>,

    /// When the task was last mutated
    pub date_updated: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Input for editing an existing task
///
/// Title and description are mandatory on edit; priority and deadline are
/// left untouched when not supplied.
#[derive(Debug, Clone)]
pub struct EditTask {
    pub title: String,
    pub description: String,
    pub priority: Option<TaskPriority>,
    pub deadline: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new task in the active state
    ///
    /// New tasks start with both lifecycle flags clear. Non-empty title and
    /// description are enforced at the request boundary.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (owner_id, title, description, priority, deadline)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.deadline)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task that is visible to its owner (not in trash)
    pub async fn find_visible(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists an owner's tasks under a status filter
    ///
    /// Ordered by creation time, newest first.
    pub async fn list_for_owner(
        pool: &PgPool,
        owner_id: Uuid,
        filter: StatusFilter,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE owner_id = $1 AND {}
            ORDER BY date_created DESC
            "#,
            filter.sql_predicate(),
        );

        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    /// Sets the completion flag
    ///
    /// Only applies to tasks outside the trash; completing or un-completing
    /// a deleted (or foreign) task matches nothing and returns None.
    pub async fn set_completed(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        completed: bool,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_completed = $3,
                date_updated = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Edits title, description, and optionally priority/deadline
    ///
    /// Unsupplied priority/deadline keep their stored values.
    pub async fn edit(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
        data: EditTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET title = $3,
                description = $4,
                priority = COALESCE($5, priority),
                deadline = COALESCE($6, deadline),
                date_updated = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.priority)
        .bind(data.deadline)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task to the trash
    ///
    /// The completion flag is untouched, so a later restore brings the task
    /// back exactly as it was.
    pub async fn soft_delete(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = TRUE,
                date_updated = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = FALSE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Restores a task from the trash
    ///
    /// Only tasks currently in the trash match; restoring an active task
    /// returns None.
    pub async fn restore(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET is_deleted = FALSE,
                date_updated = NOW()
            WHERE id = $1 AND owner_id = $2 AND is_deleted = TRUE
            RETURNING {TASK_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Erases a task permanently
    ///
    /// Works from any lifecycle state, but still only for the owner.
    ///
    /// # Returns
    ///
    /// True if a row was deleted.
    pub async fn delete_permanent(
        pool: &PgPool,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_priority_as_str() {
        assert_eq!(TaskPriority::Important.as_str(), "important");
        assert_eq!(TaskPriority::Urgent.as_str(), "urgent");
        assert_eq!(TaskPriority::VeryUrgent.as_str(), "very_urgent");
    }

    #[test]
    fn test_priority_json_representation() {
        assert_eq!(
            serde_json::to_value(TaskPriority::VeryUrgent).unwrap(),
            "VERY_URGENT"
        );
        assert_eq!(
            serde_json::from_value::<TaskPriority>(serde_json::json!("IMPORTANT")).unwrap(),
            TaskPriority::Important
        );
    }

    #[test]
    fn test_status_filter_from_str() {
        assert_eq!(StatusFilter::from_str("active"), Ok(StatusFilter::Active));
        assert_eq!(
            StatusFilter::from_str("completed"),
            Ok(StatusFilter::Completed)
        );
        assert_eq!(StatusFilter::from_str("deleted"), Ok(StatusFilter::Deleted));
        assert!(StatusFilter::from_str("archived").is_err());
        assert!(StatusFilter::from_str("").is_err());
    }

    #[test]
    fn test_status_filters_partition_flag_space() {
        let filters = [
            StatusFilter::Active,
            StatusFilter::Completed,
            StatusFilter::Deleted,
        ];

        // Every (is_completed, is_deleted) combination matches exactly one filter
        for is_completed in [false, true] {
            for is_deleted in [false, true] {
                let matching = filters
                    .iter()
                    .filter(|f| f.matches(is_completed, is_deleted))
                    .count();
                assert_eq!(
                    matching, 1,
                    "flags ({}, {}) should match exactly one filter",
                    is_completed, is_deleted
                );
            }
        }
    }

    #[test]
    fn test_status_filter_predicates() {
        assert_eq!(
            StatusFilter::Active.sql_predicate(),
            "is_deleted = FALSE AND is_completed = FALSE"
        );
        assert_eq!(
            StatusFilter::Completed.sql_predicate(),
            "is_deleted = FALSE AND is_completed = TRUE"
        );
        assert_eq!(StatusFilter::Deleted.sql_predicate(), "is_deleted = TRUE");
    }

    #[test]
    fn test_task_json_field_names() {
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: "Quarterly numbers".to_string(),
            priority: Some(TaskPriority::Urgent),
            deadline: None,
            is_completed: false,
            is_deleted: false,
            date_created: Utc::now(),
            date_updated: Utc::now(),
        };

        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("ownerId").is_some());
        assert!(json.get("isCompleted").is_some());
        assert!(json.get("isDeleted").is_some());
        assert!(json.get("dateCreated").is_some());
        assert!(json.get("dateUpdated").is_some());
        assert_eq!(json["priority"], "URGENT");
    }
}
