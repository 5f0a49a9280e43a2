use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::orders::OrderLine;
use crate::models::{cart_items, carts, services};

/// Fetch the cart owned by `user_id`, if any.
pub async fn get_cart_by_user<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<Option<carts::Model>, DbErr> {
    carts::Entity::find()
        .filter(carts::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Fetch the user's cart, creating an empty one on first use.
pub async fn get_or_create_cart<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Result<carts::Model, DbErr> {
    if let Some(cart) = get_cart_by_user(db, user_id).await? {
        return Ok(cart);
    }

    let new_cart = carts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_cart.insert(db).await
}

/// Line items of a cart in insertion order.
pub async fn get_items<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
) -> Result<Vec<cart_items::Model>, DbErr> {
    cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .order_by_asc(cart_items::Column::Position)
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(db)
        .await
}

/// Line items of a cart joined with their catalog services.
pub async fn get_items_with_services<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
) -> Result<Vec<(cart_items::Model, Option<services::Model>)>, DbErr> {
    cart_items::Entity::find()
        .find_also_related(services::Entity)
        .filter(cart_items::Column::CartId.eq(cart_id))
        .order_by_asc(cart_items::Column::Position)
        .order_by_asc(cart_items::Column::CreatedAt)
        .all(db)
        .await
}

/// Fetch a line item only if it belongs to `cart_id`.
pub async fn get_item_in_cart<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    item_id: Uuid,
) -> Result<Option<cart_items::Model>, DbErr> {
    cart_items::Entity::find_by_id(item_id)
        .filter(cart_items::Column::CartId.eq(cart_id))
        .one(db)
        .await
}

/// Whether the cart already holds a line for `service_id`.
pub async fn item_exists_for_service<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    service_id: Uuid,
) -> Result<bool, DbErr> {
    let count = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .filter(cart_items::Column::ServiceId.eq(service_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

async fn next_position<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> Result<i32, DbErr> {
    let last = cart_items::Entity::find()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .order_by_desc(cart_items::Column::Position)
        .one(db)
        .await?;

    Ok(last.map_or(0, |item| item.position + 1))
}

/// Append a line item with quantity 1.
pub async fn insert_item<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    service_id: Uuid,
) -> Result<cart_items::Model, DbErr> {
    let position = next_position(db, cart_id).await?;

    let new_item = cart_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        cart_id: Set(cart_id),
        service_id: Set(service_id),
        quantity: Set(1),
        schedule_time: Set(None),
        position: Set(position),
        created_at: Set(chrono::Utc::now()),
    };

    new_item.insert(db).await
}

/// Set quantity, and the schedule time when one is given.
pub async fn update_item<C: ConnectionTrait>(
    db: &C,
    item: cart_items::Model,
    quantity: i32,
    schedule_time: Option<chrono::DateTime<chrono::Utc>>,
) -> Result<cart_items::Model, DbErr> {
    let mut active: cart_items::ActiveModel = item.into();
    active.quantity = Set(quantity);
    if let Some(at) = schedule_time {
        active.schedule_time = Set(Some(at));
    }

    active.update(db).await
}

/// Delete a line item by ID.
pub async fn delete_item<C: ConnectionTrait>(db: &C, item_id: Uuid) -> Result<DeleteResult, DbErr> {
    cart_items::Entity::delete_by_id(item_id).exec(db).await
}

/// Replace every line in the cart with `lines`, keeping their order.
pub async fn replace_items<C: ConnectionTrait>(
    db: &C,
    cart_id: Uuid,
    lines: &[OrderLine],
) -> Result<(), DbErr> {
    cart_items::Entity::delete_many()
        .filter(cart_items::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;

    let now = chrono::Utc::now();
    for (position, line) in (0_i32..).zip(lines) {
        cart_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            cart_id: Set(cart_id),
            service_id: Set(line.service_id),
            quantity: Set(line.quantity),
            schedule_time: Set(line.schedule_time),
            position: Set(position),
            created_at: Set(now),
        }
        .insert(db)
        .await?;
    }

    touch_cart(db, cart_id).await
}

/// Bump `updated_at` on the cart.
pub async fn touch_cart<C: ConnectionTrait>(db: &C, cart_id: Uuid) -> Result<(), DbErr> {
    carts::Entity::update_many()
        .col_expr(carts::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(carts::Column::Id.eq(cart_id))
        .exec(db)
        .await?;

    Ok(())
}
