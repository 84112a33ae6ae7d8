use actix_web::web;
use std::sync::Arc;
use tokio::sync::OnceCell;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password, DEFAULT_COST};
use crate::domain::{LoginRequest, PromoteRequest, RegisterRequest, User};
use crate::error::AppError;
use crate::repository::UserRepository;

/// Registration, login and promotion on top of any `UserRepository`.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    hash_cost: u32,
    /// Verified against when the username is unknown, so that path costs one
    /// bcrypt verification as well.
    dummy_hash: Arc<OnceCell<String>>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self {
            repo,
            hash_cost: DEFAULT_COST,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Overrides the bcrypt work factor used for new passwords.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<User, AppError> {
        request.validate()?;

        let cost = self.hash_cost;
        let password = request.password;
        let password_hash = web::block(move || hash_password(&password, cost)).await??;
        let user = self.repo.register(&request.username, &password_hash).await?;

        log::info!("Registered user '{}' with role {}", user.username, user.role);
        Ok(user)
    }

    /// Returns the stored user when the password matches.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub async fn login(&self, request: LoginRequest) -> Result<User, AppError> {
        let invalid = || AppError::Unauthorized("Invalid username or password".into());

        let user = self.repo.find_by_username(&request.username).await?;
        let stored_hash = match &user {
            Some(user) => user.password_hash.clone(),
            None => self.dummy_hash().await?.to_string(),
        };

        let password = request.password;
        let matches = web::block(move || verify_password(&password, &stored_hash)).await??;

        match user {
            Some(user) if matches => Ok(user),
            Some(_) => {
                log::warn!("Wrong password for user '{}'", request.username);
                Err(invalid())
            }
            None => {
                log::warn!("Login attempt for unknown user '{}'", request.username);
                Err(invalid())
            }
        }
    }

    async fn dummy_hash(&self) -> Result<&str, AppError> {
        let cost = self.hash_cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async move {
                web::block(move || hash_password("no-such-user-password", cost)).await?
            })
            .await?;
        Ok(hash.as_str())
    }

    pub async fn promote(&self, request: PromoteRequest) -> Result<(), AppError> {
        request.validate()?;
        self.repo.promote(&request.username).await?;
        log::info!("Promoted user '{}' to admin", request.username);
        Ok(())
    }
}
