use crate::{
    auth::{AuthenticatedUser, MessageResponse},
    error::AppError,
    models::TaskInput,
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::debug;
use uuid::Uuid;
use validator::Validate;

fn task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

fn task_not_found() -> AppError {
    AppError::NotFound("task not found".into())
}

/// Lists every task. Any authenticated role.
#[get("/tasks")]
pub async fn get_tasks(tasks: web::Data<TaskService>) -> Result<impl Responder, AppError> {
    Ok(HttpResponse::Ok().json(tasks.list().await?))
}

/// Retrieves a task by id. Any authenticated role.
///
/// ## Responses:
/// - `200 OK`: the task as JSON.
/// - `404 Not Found`: unknown or malformed id.
#[get("/tasks/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    match tasks.get(task_id(&id)?).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(task_not_found()),
    }
}

/// Creates a task. ADMIN only.
#[post("/tasks")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskInput>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.create(task_data.into_inner()).await?;
    debug!("task {} created by {}", task.id, caller.0.id);

    Ok(HttpResponse::Ok().json(MessageResponse::new("task added successfully")))
}

/// Replaces every field of a task. ADMIN only.
#[put("/tasks/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    id: web::Path<String>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let id = task_id(&id)?;

    match tasks.update(id, task_data.into_inner()).await? {
        Some(_) => Ok(HttpResponse::Ok().json(MessageResponse::new("task updated successfully"))),
        None => Err(task_not_found()),
    }
}

/// Deletes a task. ADMIN only.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    if !tasks.delete(task_id(&id)?).await? {
        return Err(task_not_found());
    }

    Ok(HttpResponse::Ok().json(MessageResponse::new("task deleted successfully")))
}
