use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::carts::{AddCartItem, UpdateCartItem};
use crate::response;
use crate::services::carts as cart_service;

/// POST /api/cart/add: add a service to the caller's cart.
pub async fn add_item(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<AddCartItem>,
) -> Result<HttpResponse, AppError> {
    let cart = cart_service::add_item(db.get_ref(), user.0.id, body.into_inner()).await?;
    Ok(response::ok(cart, "Service added to cart"))
}

/// GET /api/cart: the caller's cart with services resolved.
pub async fn get_cart(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let cart = cart_service::get_cart(db.get_ref(), user.0.id).await?;
    Ok(response::ok(cart, "Cart fetched successfully"))
}

/// PUT /api/cart/update: change quantity or schedule time of a line.
pub async fn update_item(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<UpdateCartItem>,
) -> Result<HttpResponse, AppError> {
    let cart = cart_service::update_item(db.get_ref(), user.0.id, body.into_inner()).await?;
    Ok(response::ok(cart, "Cart item updated"))
}

/// DELETE /api/cart/{item_id}
pub async fn remove_item(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let cart = cart_service::remove_item(db.get_ref(), user.0.id, path.into_inner()).await?;
    Ok(response::ok(cart, "Cart item removed"))
}
