use sea_orm::ConnectionTrait;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::LifecyclePolicy;
use crate::db;
use crate::errors::AppError;
use crate::models::offers::{self, CreateOffer, OfferDecision, OfferStatus, UpdateOfferPrice};
use crate::models::tasks::TaskStatus;

const DUPLICATE_OFFER: &str = "You have already made an offer on this task.";

fn positive_price(price: Option<f64>) -> Result<f64, AppError> {
    price
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| AppError::validation("price must be a positive number."))
}

/// Bid on an open task. One offer per bidder per task.
#[instrument(skip(db, input))]
pub async fn create_offer<C: ConnectionTrait>(
    db: &C,
    bidder_id: Uuid,
    input: CreateOffer,
) -> Result<offers::Model, AppError> {
    let task_id = input
        .task_id
        .ok_or_else(|| AppError::validation("task_id is required."))?;
    let price = positive_price(input.price)?;

    let task = db::tasks::get_task_by_id(db, task_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Task {task_id} not found")))?;
    if task.status != TaskStatus::Open {
        return Err(AppError::state("Task is not open for offers."));
    }
    if task.user_id == bidder_id {
        return Err(AppError::validation("You cannot bid on your own task."));
    }
    if db::offers::offer_exists_for_task_and_user(db, task_id, bidder_id).await? {
        return Err(AppError::conflict(DUPLICATE_OFFER));
    }

    let offer = db::offers::insert_offer(db, task_id, bidder_id, price)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict(DUPLICATE_OFFER),
            other => other,
        })?;

    info!(offer_id = %offer.id, %task_id, price, "Offer created");
    Ok(offer)
}

/// Change the price of the caller's own pending offer.
#[instrument(skip(db, input))]
pub async fn update_price<C: ConnectionTrait>(
    db: &C,
    bidder_id: Uuid,
    offer_id: Uuid,
    input: UpdateOfferPrice,
) -> Result<offers::Model, AppError> {
    let price = positive_price(input.price)?;

    let offer = db::offers::get_offer_by_id(db, offer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))?;
    if offer.user_id != bidder_id {
        return Err(AppError::forbidden("You do not own this offer"));
    }
    if offer.status != OfferStatus::Pending {
        return Err(AppError::state("Only pending offers can be repriced."));
    }

    if !db::offers::update_price_if_pending(db, offer_id, price).await? {
        warn!(%offer_id, "Offer resolved while repricing");
        return Err(AppError::state("Only pending offers can be repriced."));
    }

    reload(db, offer_id).await
}

pub async fn accept_offer<C: ConnectionTrait>(
    db: &C,
    policy: &LifecyclePolicy,
    actor_id: Uuid,
    offer_id: Uuid,
    input: OfferDecision,
) -> Result<offers::Model, AppError> {
    resolve(db, policy, actor_id, offer_id, input, OfferStatus::Accepted).await
}

pub async fn decline_offer<C: ConnectionTrait>(
    db: &C,
    policy: &LifecyclePolicy,
    actor_id: Uuid,
    offer_id: Uuid,
    input: OfferDecision,
) -> Result<offers::Model, AppError> {
    resolve(db, policy, actor_id, offer_id, input, OfferStatus::Declined).await
}

/// Accept or decline. The offer id, task id and caller must all line up
/// with one offer the caller made, otherwise the offer reads as missing.
/// Sibling offers on the same task are left alone.
#[instrument(skip(db, policy, input))]
async fn resolve<C: ConnectionTrait>(
    db: &C,
    policy: &LifecyclePolicy,
    actor_id: Uuid,
    offer_id: Uuid,
    input: OfferDecision,
    outcome: OfferStatus,
) -> Result<offers::Model, AppError> {
    let task_id = input
        .task_id
        .ok_or_else(|| AppError::validation("task_id is required."))?;

    let offer = db::offers::get_offer_by_id(db, offer_id)
        .await?
        .filter(|o| o.task_id == task_id && o.user_id == actor_id)
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))?;
    if offer.status != OfferStatus::Pending {
        return Err(AppError::state("Offer has already been resolved."));
    }

    if outcome == OfferStatus::Accepted
        && !policy.allow_sibling_accepts
        && db::offers::accepted_offer_exists_for_task(db, task_id, offer_id).await?
    {
        return Err(AppError::conflict(
            "Another offer on this task has already been accepted.",
        ));
    }

    if !db::offers::set_status_if_pending(db, offer_id, outcome).await? {
        warn!(%offer_id, ?outcome, "Offer resolved concurrently");
        return Err(AppError::state("Offer has already been resolved."));
    }

    info!(%offer_id, %task_id, ?outcome, "Offer resolved");
    reload(db, offer_id).await
}

async fn reload<C: ConnectionTrait>(db: &C, offer_id: Uuid) -> Result<offers::Model, AppError> {
    db::offers::get_offer_by_id(db, offer_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Offer {offer_id} not found")))
}
