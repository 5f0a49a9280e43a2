use sea_orm::ConnectionTrait;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db;
use crate::errors::AppError;
use crate::models::carts::{self, AddCartItem, CartLine, CartView, UpdateCartItem};

const DUPLICATE_ITEM: &str = "Service is already in the cart.";

/// Load a cart with every line's service resolved.
pub async fn load_view<C: ConnectionTrait>(db: &C, cart: carts::Model) -> Result<CartView, AppError> {
    let items = db::carts::get_items_with_services(db, cart.id)
        .await?
        .into_iter()
        .map(|(item, service)| CartLine { item, service })
        .collect();

    Ok(CartView { cart, items })
}

async fn require_cart<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<carts::Model, AppError> {
    db::carts::get_cart_by_user(db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart not found."))
}

#[instrument(skip(db, input))]
pub async fn add_item<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    input: AddCartItem,
) -> Result<CartView, AppError> {
    let service_id = input
        .service_id
        .ok_or_else(|| AppError::validation("service_id is required."))?;

    db::services::get_service_by_id(db, service_id)
        .await?
        .ok_or_else(|| AppError::not_found("Service not found."))?;

    let cart = db::carts::get_or_create_cart(db, user_id).await?;
    if db::carts::item_exists_for_service(db, cart.id, service_id).await? {
        return Err(AppError::conflict(DUPLICATE_ITEM));
    }

    // The unique index still catches a concurrent add of the same service.
    db::carts::insert_item(db, cart.id, service_id)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::conflict(DUPLICATE_ITEM),
            other => other,
        })?;
    db::carts::touch_cart(db, cart.id).await?;

    info!(cart_id = %cart.id, %service_id, "Cart item added");
    load_view(db, cart).await
}

#[instrument(skip(db))]
pub async fn get_cart<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<CartView, AppError> {
    let cart = require_cart(db, user_id).await?;
    load_view(db, cart).await
}

#[instrument(skip(db, input))]
pub async fn update_item<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    input: UpdateCartItem,
) -> Result<CartView, AppError> {
    let item_id = input
        .item_id
        .ok_or_else(|| AppError::validation("item_id is required."))?;
    let quantity = input
        .quantity
        .filter(|q| *q > 0)
        .and_then(|q| i32::try_from(q).ok())
        .ok_or_else(|| AppError::validation("quantity must be a positive integer."))?;

    let cart = require_cart(db, user_id).await?;
    let item = db::carts::get_item_in_cart(db, cart.id, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item not found."))?;

    db::carts::update_item(db, item, quantity, input.schedule_time).await?;
    db::carts::touch_cart(db, cart.id).await?;

    load_view(db, cart).await
}

#[instrument(skip(db))]
pub async fn remove_item<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    item_id: Uuid,
) -> Result<CartView, AppError> {
    let cart = require_cart(db, user_id).await?;
    db::carts::get_item_in_cart(db, cart.id, item_id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart item not found."))?;

    db::carts::delete_item(db, item_id).await?;
    db::carts::touch_cart(db, cart.id).await?;

    info!(cart_id = %cart.id, %item_id, "Cart item removed");
    load_view(db, cart).await
}
