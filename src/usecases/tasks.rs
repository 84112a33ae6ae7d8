use std::sync::Arc;
use validator::Validate;

use crate::domain::{Task, TaskInput, TaskUpdate};
use crate::error::AppError;
use crate::repository::TaskRepository;

/// Task CRUD on top of any `TaskRepository`.
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Task>, AppError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: i64) -> Result<Task, AppError> {
        self.repo.get(id).await
    }

    pub async fn create(&self, input: TaskInput) -> Result<Task, AppError> {
        input.validate()?;
        let task = self.repo.create(input.into()).await?;
        log::info!("Created task {}", task.id);
        Ok(task)
    }

    /// Updates the non-empty fields of `update`.
    ///
    /// An update without any such field touches nothing and succeeds with `None`,
    /// whether or not the task exists.
    pub async fn update(&self, id: i64, update: TaskUpdate) -> Result<Option<Task>, AppError> {
        let update = update.normalized();
        update.validate()?;

        if update.is_empty() {
            log::debug!("Nothing to update for task {}", id);
            return Ok(None);
        }

        let task = self.repo.update(id, &update).await?;
        log::info!("Updated task {}", id);
        Ok(Some(task))
    }

    /// Deleting an id that does not exist is not an error.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.repo.delete(id).await?;
        log::info!("Deleted task {}", id);
        Ok(())
    }
}
