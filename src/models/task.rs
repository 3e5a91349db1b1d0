use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating or replacing a task.
/// Contains validation rules for its fields.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Free-form description, at most 1000 characters.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub description: String,

    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,

    /// Free-form status label (e.g. "pending", "done").
    #[serde(default)]
    #[validate(length(max = 50))]
    pub status: String,
}

/// Represents a task as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub status: String,
}

impl Task {
    /// Builds a task with the given id from `input`.
    pub fn from_input(id: Uuid, input: TaskInput) -> Self {
        Self {
            id,
            title: input.title,
            description: input.description,
            due_date: input.due_date,
            status: input.status,
        }
    }

    /// Replaces every mutable field with the values from `input`. The id is kept.
    pub fn replace_with(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.due_date = input.due_date;
        self.status = input.status;
    }
}
