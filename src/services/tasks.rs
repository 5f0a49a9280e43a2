use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::authorization::verify_task_owner;
use crate::db;
use crate::db::tasks::NewTask;
use crate::errors::AppError;
use crate::models::OneOrMany;
use crate::models::offers::{self, OfferStatus};
use crate::models::orders::{OrderStatus, PlacedOrder};
use crate::models::tasks::{self, CreateTask, TaskCheckoutRequest, TaskStatus, UpdateTaskStatus};
use crate::models::users::{self, Roles};
use crate::services::checkout::{
    self, OrderDraft, ensure_pin, ensure_profile_verified, normalize_code,
};

#[instrument(skip(db, input))]
pub async fn create_task<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    input: CreateTask,
) -> Result<tasks::Model, AppError> {
    let category_id = input
        .category_id
        .ok_or_else(|| AppError::validation("category_id is required."))?;
    let location = input
        .location
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .ok_or_else(|| AppError::validation("location is required."))?;
    let description = input
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::validation("description is required."))?;
    let budget = input
        .budget
        .filter(|b| b.is_finite() && *b > 0.0)
        .ok_or_else(|| AppError::validation("budget must be a positive number."))?;
    let images = input
        .images
        .map(OneOrMany::into_vec)
        .unwrap_or_default()
        .into_iter()
        .filter(|path| !path.trim().is_empty())
        .collect();

    let task = db::tasks::insert_task(
        db,
        NewTask {
            user_id,
            category_id,
            subcategory_id: input.subcategory_id,
            location,
            description,
            budget,
            images,
        },
    )
    .await?;

    info!(task_id = %task.id, "Task created");
    Ok(task)
}

pub async fn get_task<C: ConnectionTrait>(db: &C, task_id: Uuid) -> Result<tasks::Model, AppError> {
    db::tasks::get_task_by_id(db, task_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))
}

pub async fn list_my_tasks<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Vec<tasks::Model>, AppError> {
    Ok(db::tasks::get_tasks_by_user(db, user_id).await?)
}

pub async fn list_open_tasks<C: ConnectionTrait>(db: &C) -> Result<Vec<tasks::Model>, AppError> {
    Ok(db::tasks::get_open_tasks(db).await?)
}

#[instrument(skip(db))]
pub async fn cancel_task<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<tasks::Model, AppError> {
    let task = verify_task_owner(db, task_id, user_id).await?;
    if !task.status.is_cancellable() {
        return Err(AppError::state("Task can no longer be cancelled."));
    }

    if !db::tasks::transition_status(db, task_id, task.status, TaskStatus::Cancelled).await? {
        warn!(%task_id, "Task changed status concurrently");
        return Err(AppError::state("Task status changed; reload and try again."));
    }

    info!(%task_id, "Task cancelled");
    get_task(db, task_id).await
}

/// Hero or driver moves someone else's task along.
#[instrument(skip(db, user, input), fields(user_id = %user.id))]
pub async fn update_task_status<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    task_id: Uuid,
    input: UpdateTaskStatus,
) -> Result<tasks::Model, AppError> {
    if !matches!(user.role, Roles::Hero | Roles::Driver) {
        return Err(AppError::forbidden(
            "Only heroes and drivers can update task status.",
        ));
    }

    let task = get_task(db, task_id).await?;
    if !task.status.can_advance_to(input.status) {
        return Err(AppError::state(format!(
            "Cannot move task from {:?} to {:?}.",
            task.status, input.status
        )));
    }

    if !db::tasks::transition_status(db, task_id, task.status, input.status).await? {
        warn!(%task_id, "Task changed status concurrently");
        return Err(AppError::state("Task status changed; reload and try again."));
    }

    info!(%task_id, from = ?task.status, to = ?input.status, "Task status changed");
    get_task(db, task_id).await
}

/// The task owner sees every offer; anyone else sees only their own.
pub async fn list_task_offers<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    task_id: Uuid,
) -> Result<Vec<offers::Model>, AppError> {
    let task = get_task(db, task_id).await?;
    let bidder = (task.user_id != user_id).then_some(user_id);

    Ok(db::offers::get_offers_for_task(db, task_id, bidder).await?)
}

/// Pay for a task against an accepted offer on it.
#[instrument(skip(db, user, req), fields(user_id = %user.id))]
pub async fn checkout_task(
    db: &DatabaseConnection,
    user: &users::Model,
    task_id: Uuid,
    req: TaskCheckoutRequest,
) -> Result<PlacedOrder, AppError> {
    ensure_profile_verified(user)?;

    let offer_id = req
        .offer_id
        .ok_or_else(|| AppError::validation("offer_id is required."))?;
    let payment_method_id = req
        .payment_method
        .ok_or_else(|| AppError::validation("payment_method is required."))?;

    ensure_pin(user, req.pin.as_deref())?;

    let driver_instruction = req.checkout.driver_instructions();
    let checkout_info = req.checkout.into_details()?;

    let task = verify_task_owner(db, task_id, user.id).await?;
    let offer = db::offers::get_offer_by_id(db, offer_id)
        .await?
        .filter(|o| o.task_id == task.id)
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))?;
    if offer.status != OfferStatus::Accepted {
        return Err(AppError::state("Offer has not been accepted."));
    }
    if task.status != TaskStatus::Open {
        return Err(AppError::state("Task is no longer open."));
    }

    checkout::persist_order(
        db,
        OrderDraft {
            id: Uuid::new_v4(),
            user_id: user.id,
            service_id: None,
            cart_id: None,
            task_id: Some(task.id),
            offer_id: Some(offer.id),
            refill_cart: false,
            line_items: Vec::new(),
            provider_ids: vec![offer.user_id],
            payment_method_id,
            checkout_info,
            driver_instruction,
            location: req
                .location
                .filter(|l| !l.trim().is_empty())
                .or(Some(task.location)),
            subtotal: offer.price,
            voucher_code: normalize_code(req.voucher_code),
            promo_code: None,
            allergies: None,
            status: OrderStatus::Placed,
            schedule: None,
            confirmation: true,
        },
    )
    .await
}
