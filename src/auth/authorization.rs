use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::db::orders as order_db;
use crate::db::tasks as task_db;
use crate::errors::AppError;
use crate::models::users::{self, Roles};
use crate::models::{orders, tasks};
use crate::policy::Actor;

/// An order as seen by one of its parties.
#[derive(Debug, Clone)]
pub struct OrderParty {
    pub order: orders::Model,
    pub provider_ids: Vec<Uuid>,
    pub actor: Actor,
}

/// Load an order and work out how `user` relates to it.
///
/// Admins act as admins everywhere. A user listed among the order's
/// providers acts as provider even on an order they also placed.
pub async fn verify_order_party<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    user: &users::Model,
) -> Result<OrderParty, AppError> {
    let order = order_db::get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
    let provider_ids = order_db::get_provider_ids(db, order.id).await?;

    let actor = if user.role == Roles::Admin {
        Actor::Admin
    } else if provider_ids.contains(&user.id) {
        Actor::Provider
    } else if order.user_id == user.id {
        Actor::Owner
    } else {
        return Err(AppError::forbidden("You are not a party to this order"));
    };

    Ok(OrderParty {
        order,
        provider_ids,
        actor,
    })
}

/// Load an order the caller placed. Anyone else's order reads as missing.
pub async fn verify_order_owner<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    user_id: Uuid,
) -> Result<orders::Model, AppError> {
    match order_db::get_order_by_id(db, order_id).await? {
        Some(order) if order.user_id == user_id => Ok(order),
        _ => Err(AppError::not_found(format!("Order {order_id} not found"))),
    }
}

pub async fn verify_task_owner<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<tasks::Model, AppError> {
    match task_db::get_task_by_id(db, task_id).await? {
        Some(task) if task.user_id == user_id => Ok(task),
        Some(_) => Err(AppError::forbidden("You do not own this task")),
        None => Err(AppError::not_found(format!("Task {task_id} not found"))),
    }
}
