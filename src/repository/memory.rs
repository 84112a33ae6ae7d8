use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{duplicate_user, task_not_found, TaskRepository, UserRepository};
use crate::domain::{Role, Task, TaskUpdate, User};
use crate::error::AppError;

/// In-process task store. A `BTreeMap` keeps `list` ordered by id.
#[derive(Debug, Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<BTreeMap<i64, Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn list(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.tasks.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Task, AppError> {
        self.tasks
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(task_not_found)
    }

    async fn create(&self, task: Task) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(AppError::BadRequest("id already exists".into()));
        }
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, update: &TaskUpdate) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().await;
        let task = tasks.get_mut(&id).ok_or_else(task_not_found)?;
        update.apply_to(task);
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.tasks.write().await.remove(&id);
        Ok(())
    }
}

/// In-process user store keyed by username.
#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn register(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        // The write lock covers both the emptiness check and the insert, so only
        // one caller can ever be handed the admin role.
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(duplicate_user(username));
        }

        let role = if users.is_empty() {
            Role::Admin
        } else {
            Role::Regular
        };
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role,
        };
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn promote(&self, username: &str) -> Result<(), AppError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(username)
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;
        user.role = Role::Admin;
        Ok(())
    }
}
