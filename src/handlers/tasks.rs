use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::tasks::{CreateTask, TaskCheckoutRequest, UpdateTaskStatus};
use crate::response;
use crate::services::tasks as task_service;

/// POST /api/tasks
pub async fn create_task(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateTask>,
) -> Result<HttpResponse, AppError> {
    let task = task_service::create_task(db.get_ref(), user.0.id, body.into_inner()).await?;
    Ok(response::created(task, "Task created successfully"))
}

/// GET /api/tasks: the caller's tasks, newest first.
pub async fn get_my_tasks(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let tasks = task_service::list_my_tasks(db.get_ref(), user.0.id).await?;
    Ok(response::ok(tasks, "Tasks fetched successfully"))
}

/// GET /api/tasks/open
pub async fn get_open_tasks(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let tasks = task_service::list_open_tasks(db.get_ref()).await?;
    Ok(response::ok(tasks, "Open tasks fetched successfully"))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = task_service::get_task(db.get_ref(), path.into_inner()).await?;
    Ok(response::ok(task, "Task fetched successfully"))
}

/// POST /api/tasks/{id}/cancel
pub async fn cancel_task(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let task = task_service::cancel_task(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(response::ok(task, "Task cancelled"))
}

/// PATCH /api/tasks/{id}/status: hero/driver accept, reject or complete.
pub async fn update_task_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTaskStatus>,
) -> Result<HttpResponse, AppError> {
    let task = task_service::update_task_status(
        db.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(response::ok(task, "Task status updated"))
}

/// GET /api/tasks/{id}/offers
pub async fn get_task_offers(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let offers = task_service::list_task_offers(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(response::ok(offers, "Offers fetched successfully"))
}

/// POST /api/tasks/{id}/checkout: pay for the task against an accepted offer.
pub async fn checkout_task(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<TaskCheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let placed =
        task_service::checkout_task(db.get_ref(), &user.0, path.into_inner(), body.into_inner())
            .await?;
    Ok(response::created(placed, "Task checkout successful"))
}
