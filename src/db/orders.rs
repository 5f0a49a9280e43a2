use sea_orm::prelude::Expr;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::checkout::{CheckoutDetails, DriverInstructions};
use crate::models::order_providers;
use crate::models::orders::{self, LineItems, OrderLine, OrderStatus};

/// Fully resolved order row, ready to insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    pub line_items: Vec<OrderLine>,
    pub payment_method_id: Uuid,
    pub checkout_info: CheckoutDetails,
    pub driver_instruction: Option<DriverInstructions>,
    pub location: Option<String>,
    pub subtotal: f64,
    pub discount_amount: f64,
    pub total_price: f64,
    pub voucher_code: Option<String>,
    pub promo_code: Option<String>,
    pub allergies: Option<String>,
    pub status: OrderStatus,
    pub schedule: Option<(chrono::DateTime<chrono::Utc>, String)>,
    pub confirmation: bool,
}

pub async fn insert_order<C: ConnectionTrait>(
    db: &C,
    input: NewOrder,
) -> Result<orders::Model, DbErr> {
    let (schedule_date, schedule_time_slot) = match input.schedule {
        Some((date, slot)) => (Some(date), Some(slot)),
        None => (None, None),
    };

    let new_order = orders::ActiveModel {
        id: Set(input.id),
        user_id: Set(input.user_id),
        service_id: Set(input.service_id),
        cart_id: Set(input.cart_id),
        task_id: Set(input.task_id),
        offer_id: Set(input.offer_id),
        line_items: Set(LineItems(input.line_items)),
        payment_method_id: Set(input.payment_method_id),
        checkout_type: Set(input.checkout_info.checkout_type()),
        checkout_info: Set(input.checkout_info),
        driver_instruction: Set(input.driver_instruction),
        location: Set(input.location),
        subtotal: Set(input.subtotal),
        discount_amount: Set(input.discount_amount),
        total_price: Set(input.total_price),
        voucher_code: Set(input.voucher_code),
        promo_code: Set(input.promo_code),
        allergies: Set(input.allergies),
        status: Set(input.status),
        schedule_date: Set(schedule_date),
        schedule_time_slot: Set(schedule_time_slot),
        confirmation: Set(input.confirmation),
        qr_data: Set(None),
        rating: Set(None),
        feedback: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_order.insert(db).await
}

/// Record the providers backing an order. `provider_ids` must already be distinct.
pub async fn insert_providers<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    provider_ids: &[Uuid],
) -> Result<(), DbErr> {
    for provider_id in provider_ids {
        order_providers::ActiveModel {
            order_id: Set(order_id),
            provider_id: Set(*provider_id),
        }
        .insert(db)
        .await?;
    }

    Ok(())
}

/// Fetch a single order by ID.
pub async fn get_order_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<orders::Model>, DbErr> {
    orders::Entity::find_by_id(id).one(db).await
}

/// Provider ids of one order.
pub async fn get_provider_ids<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
) -> Result<Vec<Uuid>, DbErr> {
    let rows = order_providers::Entity::find()
        .filter(order_providers::Column::OrderId.eq(order_id))
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|r| r.provider_id).collect())
}

/// Provider ids for many orders in one query, keyed by order id.
pub async fn get_provider_ids_for_orders<C: ConnectionTrait>(
    db: &C,
    order_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<Uuid>>, DbErr> {
    if order_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = order_providers::Entity::find()
        .filter(order_providers::Column::OrderId.is_in(order_ids.to_vec()))
        .all(db)
        .await?;

    let mut by_order: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for row in rows {
        by_order.entry(row.order_id).or_default().push(row.provider_id);
    }

    Ok(by_order)
}

/// A user's orders, newest first, optionally filtered by status.
pub async fn get_orders_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    status: Option<OrderStatus>,
    offset: u64,
    limit: u64,
) -> Result<Vec<orders::Model>, DbErr> {
    let mut query = orders::Entity::find().filter(orders::Column::UserId.eq(user_id));
    if let Some(status) = status {
        query = query.filter(orders::Column::Status.eq(status));
    }

    query
        .order_by_desc(orders::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
}

/// Orders that list `provider_id` among their providers, newest first.
pub async fn get_orders_for_provider<C: ConnectionTrait>(
    db: &C,
    provider_id: Uuid,
    status: Option<OrderStatus>,
    offset: u64,
    limit: u64,
) -> Result<Vec<orders::Model>, DbErr> {
    let mut query = orders::Entity::find()
        .inner_join(order_providers::Entity)
        .filter(order_providers::Column::ProviderId.eq(provider_id));
    if let Some(status) = status {
        query = query.filter(orders::Column::Status.eq(status));
    }

    query
        .order_by_desc(orders::Column::CreatedAt)
        .offset(offset)
        .limit(limit)
        .all(db)
        .await
}

/// Move an order from `from` to `to` only if it is still in `from`.
/// `confirmation` is written alongside when given.
pub async fn transition_status<C: ConnectionTrait>(
    db: &C,
    order_id: Uuid,
    from: OrderStatus,
    to: OrderStatus,
    confirmation: Option<bool>,
) -> Result<bool, DbErr> {
    let mut update = orders::Entity::update_many()
        .col_expr(orders::Column::Status, Expr::value(to))
        .col_expr(orders::Column::UpdatedAt, Expr::value(chrono::Utc::now()));
    if let Some(confirmed) = confirmation {
        update = update.col_expr(orders::Column::Confirmation, Expr::value(confirmed));
    }

    let result = update
        .filter(orders::Column::Id.eq(order_id))
        .filter(orders::Column::Status.eq(from))
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}

pub async fn set_rating<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
    rating: i32,
    feedback: Option<String>,
) -> Result<orders::Model, DbErr> {
    let mut active: orders::ActiveModel = order.into();
    active.rating = Set(Some(rating));
    active.feedback = Set(feedback);
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

pub async fn set_qr_data<C: ConnectionTrait>(
    db: &C,
    order: orders::Model,
    qr_data: String,
) -> Result<orders::Model, DbErr> {
    let mut active: orders::ActiveModel = order.into();
    active.qr_data = Set(Some(qr_data));
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
