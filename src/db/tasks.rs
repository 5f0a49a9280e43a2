use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::tasks::{self, ImageList, TaskStatus};

/// Validated input for a new task.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub location: String,
    pub description: String,
    pub budget: f64,
    pub images: Vec<String>,
}

/// Insert a task in the `Open` state.
pub async fn insert_task<C: ConnectionTrait>(
    db: &C,
    input: NewTask,
) -> Result<tasks::Model, DbErr> {
    let new_task = tasks::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        category_id: Set(input.category_id),
        subcategory_id: Set(input.subcategory_id),
        location: Set(input.location),
        description: Set(input.description),
        budget: Set(input.budget),
        images: Set(ImageList(input.images)),
        status: Set(TaskStatus::Open),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_task.insert(db).await
}

/// Fetch a single task by ID.
pub async fn get_task_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<tasks::Model>, DbErr> {
    tasks::Entity::find_by_id(id).one(db).await
}

/// Tasks posted by `user_id`, newest first.
pub async fn get_tasks_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<tasks::Model>, DbErr> {
    tasks::Entity::find()
        .filter(tasks::Column::UserId.eq(user_id))
        .order_by_desc(tasks::Column::CreatedAt)
        .all(db)
        .await
}

/// Tasks still open for bids, newest first.
pub async fn get_open_tasks<C: ConnectionTrait>(db: &C) -> Result<Vec<tasks::Model>, DbErr> {
    tasks::Entity::find()
        .filter(tasks::Column::Status.eq(TaskStatus::Open))
        .order_by_desc(tasks::Column::CreatedAt)
        .all(db)
        .await
}

/// Move a task from `from` to `to` only if it is still in `from`.
///
/// Returns `true` when the row was updated, `false` when someone else
/// moved the task first.
pub async fn transition_status<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    from: TaskStatus,
    to: TaskStatus,
) -> Result<bool, DbErr> {
    let result = tasks::Entity::update_many()
        .col_expr(tasks::Column::Status, Expr::value(to))
        .col_expr(tasks::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(tasks::Column::Id.eq(task_id))
        .filter(tasks::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
