use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents a task entity as stored in the repository and returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Numeric identifier chosen by the client at creation time.
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Free-form status label such as "pending" or "completed".
    pub status: String,
    pub due_date: DateTime<Utc>,
}

/// Payload for creating a task. Every field is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(range(min = 1, message = "Task id must be a positive integer"))]
    pub id: i64,

    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 1000, message = "description must be 1 to 1000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 50, message = "status must be 1 to 50 characters"))]
    pub status: String,

    pub due_date: DateTime<Utc>,
}

impl From<TaskInput> for Task {
    fn from(input: TaskInput) -> Self {
        Self {
            id: input.id,
            title: input.title,
            description: input.description,
            status: input.status,
            due_date: input.due_date,
        }
    }
}

/// Partial update of a task.
///
/// Fields that are absent, or present as an empty string, keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TaskUpdate {
    #[validate(length(max = 200))]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(length(max = 50))]
    pub status: Option<String>,

    pub due_date: Option<DateTime<Utc>>,
}

impl TaskUpdate {
    /// Drops empty strings so that repositories only ever see real changes.
    pub fn normalized(self) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|s| !s.is_empty())
        }

        Self {
            title: non_empty(self.title),
            description: non_empty(self.description),
            status: non_empty(self.status),
            due_date: self.due_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
    }

    /// Applies the update to `task` in place.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(status) = &self.status {
            task.status = status.clone();
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
    }
}
