use actix_web::web;
use std::sync::Arc;

use crate::auth::{JwtService, TokenGenerator};
use crate::config::{Config, StorageBackend};
use crate::error::AppError;
use crate::repository::{
    postgres, MemoryTaskRepository, MemoryUserRepository, PgTaskRepository, PgUserRepository,
};
use crate::usecases::{TaskService, UserService};

/// Everything the handlers pull out of app data, already wrapped in `web::Data`
/// so that cloning it per worker only bumps reference counts.
#[derive(Clone)]
pub struct AppState {
    pub users: web::Data<UserService>,
    pub tasks: web::Data<TaskService>,
    pub jwt: web::Data<JwtService>,
    pub tokens: web::Data<dyn TokenGenerator>,
}

impl AppState {
    pub fn new(users: UserService, tasks: TaskService, jwt: JwtService) -> Self {
        let jwt = Arc::new(jwt);
        let tokens: Arc<dyn TokenGenerator> = jwt.clone();

        Self {
            users: web::Data::new(users),
            tasks: web::Data::new(tasks),
            jwt: web::Data::from(jwt),
            tokens: web::Data::from(tokens),
        }
    }

    /// State backed by the in-process repositories.
    pub fn in_memory(jwt_secret: &str, bcrypt_cost: u32) -> Self {
        Self::new(
            UserService::new(Arc::new(MemoryUserRepository::new())).with_hash_cost(bcrypt_cost),
            TaskService::new(Arc::new(MemoryTaskRepository::new())),
            JwtService::new(jwt_secret),
        )
    }

    /// Connects the storage backend selected by `config`.
    pub async fn from_config(config: &Config) -> Result<Self, AppError> {
        match config.storage {
            StorageBackend::Memory => {
                log::warn!("Using in-memory storage; data is lost on restart");
                Ok(Self::in_memory(&config.jwt_secret, config.bcrypt_cost))
            }
            StorageBackend::Postgres => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    AppError::InternalServerError("DATABASE_URL is not configured".into())
                })?;
                let pool = postgres::connect(url).await?;
                log::info!("Connected to PostgreSQL and applied migrations");

                Ok(Self::new(
                    UserService::new(Arc::new(PgUserRepository::new(pool.clone())))
                        .with_hash_cost(config.bcrypt_cost),
                    TaskService::new(Arc::new(PgTaskRepository::new(pool))),
                    JwtService::new(&config.jwt_secret),
                ))
            }
        }
    }

    /// Registers the services as app data.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.users.clone())
            .app_data(self.tasks.clone())
            .app_data(self.jwt.clone())
            .app_data(self.tokens.clone());
    }
}
