use crate::{
    auth::{AdminUser, AuthenticatedUser},
    domain::{TaskInput, TaskUpdate},
    error::AppError,
    usecases::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;

/// Lists every task, ordered by id.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks (possibly empty).
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    _user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(tasks.list().await?))
}

/// Retrieves a task by its numeric id.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `400 Bad Request`: `id` is not an integer.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no task with this id.
#[get("/{id}")]
pub async fn get_task(
    _user: AuthenticatedUser,
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task = tasks.get(task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a task. Admin only.
///
/// ## Request Body:
/// `id`, `title`, `description`, `status` and `due_date` (RFC 3339), all required.
///
/// ## Responses:
/// - `201 Created`: the created task.
/// - `400 Bad Request`: malformed body, failed validation, or duplicate id.
/// - `401 Unauthorized` / `403 Forbidden`: missing token or non-admin caller.
#[post("")]
pub async fn create_task(
    _admin: AdminUser,
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = tasks.create(task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Updates the given fields of a task. Admin only.
///
/// Fields that are omitted or empty keep their current value. A body with
/// nothing to change is accepted as is, even for an unknown id.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task updated successfully"}`.
/// - `400 Bad Request`: non-integer id or malformed body.
/// - `401 Unauthorized` / `403 Forbidden`: missing token or non-admin caller.
/// - `404 Not Found`: there was something to change but no task with this id.
#[put("/{id}")]
pub async fn update_task(
    _admin: AdminUser,
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    tasks
        .update(task_id.into_inner(), task_data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task updated successfully"
    })))
}

/// Deletes a task. Admin only.
///
/// ## Responses:
/// - `204 No Content`: the task is gone, including when it never existed.
/// - `400 Bad Request`: non-integer id.
/// - `401 Unauthorized` / `403 Forbidden`: missing token or non-admin caller.
#[delete("/{id}")]
pub async fn delete_task(
    _admin: AdminUser,
    tasks: web::Data<TaskService>,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    tasks.delete(task_id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
