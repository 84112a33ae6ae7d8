use crate::{
    auth::{AdminUser, AuthMiddleware, AuthResponse, TokenGenerator},
    domain::{LoginRequest, PromoteRequest, RegisterRequest},
    error::AppError,
    usecases::UserService,
};
use actix_web::{post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Register a new user
///
/// The first account ever registered becomes an admin, every later one a regular user.
///
/// ## Responses:
/// - `201 Created`: `{"message": "User registered successfully"}`.
/// - `400 Bad Request`: malformed body, invalid username, password shorter than
///   8 characters, or a username that is already taken.
#[post("/register")]
pub async fn register(
    users: web::Data<UserService>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    users.register(register_data.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Login user
///
/// Verifies the credentials and returns a JWT valid for two hours.
///
/// ## Responses:
/// - `200 OK`: `{"token": "<jwt>"}`.
/// - `400 Bad Request`: malformed body.
/// - `401 Unauthorized`: unknown username or wrong password.
/// - `500 Internal Server Error`: the token could not be signed.
#[post("/login")]
pub async fn login(
    users: web::Data<UserService>,
    tokens: web::Data<dyn TokenGenerator>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let user = users.login(login_data.into_inner()).await?;

    let token = tokens.generate_token(&user).map_err(|e| {
        log::error!("Token generation failed for '{}': {}", user.username, e);
        AppError::InternalServerError("Could not generate token".into())
    })?;

    Ok(HttpResponse::Ok().json(AuthResponse { token }))
}

/// Promote a user to admin
///
/// Admin only. Takes `{"username": "..."}`.
///
/// ## Responses:
/// - `200 OK`: `{"message": "User promoted to admin"}`.
/// - `401 Unauthorized` / `403 Forbidden`: missing token or non-admin caller.
/// - `404 Not Found`: no such user.
#[put("/promote", wrap = "AuthMiddleware")]
pub async fn promote(
    admin: AdminUser,
    users: web::Data<UserService>,
    promote_data: web::Json<PromoteRequest>,
) -> Result<impl Responder, AppError> {
    let request = promote_data.into_inner();
    log::info!("'{}' is promoting '{}'", admin.0.username, request.username);
    users.promote(request).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User promoted to admin"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::User;
    use crate::repository::MemoryUserRepository;
    use crate::routes::request_config;
    use actix_web::{http::StatusCode, test, App};
    use serde_json::Value;
    use std::sync::Arc;

    struct FailingTokens;

    impl TokenGenerator for FailingTokens {
        fn generate_token(&self, _user: &User) -> Result<String, AppError> {
            Err(AppError::InternalServerError(
                "internal server error during token signing".into(),
            ))
        }
    }

    #[actix_rt::test]
    async fn test_login_token_generation_failure() {
        let users = UserService::new(Arc::new(MemoryUserRepository::new())).with_hash_cost(4);
        users
            .register(RegisterRequest {
                username: "testuser".to_string(),
                password: "correctpassword".to_string(),
            })
            .await
            .unwrap();

        let tokens: Arc<dyn TokenGenerator> = Arc::new(FailingTokens);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(users))
                .app_data(web::Data::from(tokens))
                .configure(request_config)
                .service(login),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(json!({ "username": "testuser", "password": "correctpassword" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Could not generate token" }));
    }

    #[actix_rt::test]
    async fn test_register_rejects_malformed_json() {
        let users = UserService::new(Arc::new(MemoryUserRepository::new())).with_hash_cost(4);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(users))
                .configure(request_config)
                .service(register),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/register")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(r#"{"username": "testuser", "passwordHash": }"#)
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].is_string());
    }
}
