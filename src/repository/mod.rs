//! Storage ports.
//!
//! The usecases only ever see `TaskRepository` and `UserRepository`; the binary
//! decides which implementation backs them. `postgres` talks to a database through
//! sqlx, `memory` keeps everything in process and is what the test suites run on.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::domain::{Task, TaskUpdate, User};
use crate::error::AppError;

pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// All tasks, ordered by id.
    async fn list(&self) -> Result<Vec<Task>, AppError>;

    /// Fails with `NotFound` when no task has this id.
    async fn get(&self, id: i64) -> Result<Task, AppError>;

    /// Fails with `BadRequest` when the id is already taken.
    async fn create(&self, task: Task) -> Result<Task, AppError>;

    /// Applies a normalized update and returns the stored task.
    async fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task, AppError>;

    /// Succeeds even when no task has this id.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Stores a new user. The very first user becomes an admin, everybody after
    /// that starts out as a regular user.
    async fn register(&self, username: &str, password_hash: &str) -> Result<User, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Fails with `NotFound` when the user does not exist.
    async fn promote(&self, username: &str) -> Result<(), AppError>;
}

pub(crate) fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

pub(crate) fn duplicate_user(username: &str) -> AppError {
    AppError::BadRequest(format!("user with username '{}' already exists", username))
}
