pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::{error, web};

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route. `/register`, `/login` and `/health` are public,
/// everything else goes through `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    request_config(cfg);

    cfg.service(health::health)
        .service(auth::register)
        .service(auth::login)
        .service(auth::promote)
        .service(
            web::scope("/tasks")
                .wrap(AuthMiddleware)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}

/// Turns body and path extraction failures into JSON `400` errors.
pub fn request_config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        let message = match &err {
            error::JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
            other => format!("Bad Request: {}", other),
        };
        AppError::BadRequest(message).into()
    }))
    .app_data(
        web::PathConfig::default()
            .error_handler(|_err, _req| AppError::BadRequest("Invalid Task ID".into()).into()),
    );
}
