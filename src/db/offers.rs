use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::offers::{self, OfferStatus};

/// Insert a pending offer from `user_id` on `task_id`.
pub async fn insert_offer<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    user_id: Uuid,
    price: f64,
) -> Result<offers::Model, DbErr> {
    let new_offer = offers::ActiveModel {
        id: Set(Uuid::new_v4()),
        task_id: Set(task_id),
        user_id: Set(user_id),
        price: Set(price),
        status: Set(OfferStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_offer.insert(db).await
}

/// Fetch a single offer by ID.
pub async fn get_offer_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<offers::Model>, DbErr> {
    offers::Entity::find_by_id(id).one(db).await
}

/// Whether `user_id` already bid on `task_id`.
pub async fn offer_exists_for_task_and_user<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    let count = offers::Entity::find()
        .filter(offers::Column::TaskId.eq(task_id))
        .filter(offers::Column::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Offers on a task, oldest first. Pass `bidder` to restrict to one user's offers.
pub async fn get_offers_for_task<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    bidder: Option<Uuid>,
) -> Result<Vec<offers::Model>, DbErr> {
    let mut query = offers::Entity::find().filter(offers::Column::TaskId.eq(task_id));
    if let Some(user_id) = bidder {
        query = query.filter(offers::Column::UserId.eq(user_id));
    }

    query
        .order_by_asc(offers::Column::CreatedAt)
        .all(db)
        .await
}

/// Whether any offer on the task has been accepted, other than `except`.
pub async fn accepted_offer_exists_for_task<C: ConnectionTrait>(
    db: &C,
    task_id: Uuid,
    except: Uuid,
) -> Result<bool, DbErr> {
    let count = offers::Entity::find()
        .filter(offers::Column::TaskId.eq(task_id))
        .filter(offers::Column::Status.eq(OfferStatus::Accepted))
        .filter(offers::Column::Id.ne(except))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Set the price of a pending offer. Returns `false` if the offer is no longer pending.
pub async fn update_price_if_pending<C: ConnectionTrait>(
    db: &C,
    offer_id: Uuid,
    price: f64,
) -> Result<bool, DbErr> {
    let result = offers::Entity::update_many()
        .col_expr(offers::Column::Price, Expr::value(price))
        .col_expr(offers::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(offers::Column::Id.eq(offer_id))
        .filter(offers::Column::Status.eq(OfferStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

/// Resolve a pending offer. Returns `false` if it was already resolved.
pub async fn set_status_if_pending<C: ConnectionTrait>(
    db: &C,
    offer_id: Uuid,
    status: OfferStatus,
) -> Result<bool, DbErr> {
    let result = offers::Entity::update_many()
        .col_expr(offers::Column::Status, Expr::value(status))
        .col_expr(offers::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(offers::Column::Id.eq(offer_id))
        .filter(offers::Column::Status.eq(OfferStatus::Pending))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
