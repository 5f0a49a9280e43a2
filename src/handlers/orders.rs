use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::config::LifecyclePolicy;
use crate::errors::AppError;
use crate::models::orders::{
    AttachQr, OrderListQuery, PlaceOrderRequest, RateOrder, ReorderRequest, ScheduleOrderRequest,
    UpdateOrderStatus,
};
use crate::response;
use crate::services::orders as order_service;
use crate::services::reorder as reorder_service;

/// POST /api/orders/place: check out a single service.
pub async fn place_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    body: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let placed =
        order_service::place_order(db.get_ref(), policy.get_ref(), &user.0, body.into_inner())
            .await?;
    Ok(response::created(placed, "Order placed successfully"))
}

/// POST /api/orders/schedule: check out the caller's cart for later.
pub async fn schedule_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    body: web::Json<ScheduleOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let placed =
        order_service::schedule_order(db.get_ref(), policy.get_ref(), &user.0, body.into_inner())
            .await?;
    Ok(response::created(placed, "Order scheduled successfully"))
}

/// POST /api/orders/reorder
pub async fn reorder(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    body: web::Json<ReorderRequest>,
) -> Result<HttpResponse, AppError> {
    let placed =
        reorder_service::reorder(db.get_ref(), policy.get_ref(), &user.0, body.into_inner())
            .await?;
    Ok(response::created(placed, "Order reordered successfully"))
}

/// GET /api/orders?status=&page=&limit=
pub async fn get_my_orders(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
    let orders = order_service::list_orders(db.get_ref(), user.0.id, query.into_inner()).await?;
    Ok(response::ok(orders, "Orders fetched successfully"))
}

/// GET /api/orders/provider: orders the caller is a provider on.
pub async fn get_provider_orders(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    query: web::Query<OrderListQuery>,
) -> Result<HttpResponse, AppError> {
    let orders =
        order_service::list_provider_orders(db.get_ref(), user.0.id, query.into_inner()).await?;
    Ok(response::ok(orders, "Orders fetched successfully"))
}

/// GET /api/orders/{id}
pub async fn get_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::get_order(db.get_ref(), &user.0, path.into_inner()).await?;
    Ok(response::ok(order, "Order fetched successfully"))
}

/// GET /api/orders/{id}/track
pub async fn track_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let tracking = order_service::track_order(db.get_ref(), &user.0, path.into_inner()).await?;
    Ok(response::ok(tracking, "Tracking info fetched successfully"))
}

/// POST /api/orders/{id}/qr
pub async fn attach_qr(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<AttachQr>,
) -> Result<HttpResponse, AppError> {
    let order =
        order_service::attach_qr(db.get_ref(), &user.0, path.into_inner(), body.into_inner())
            .await?;
    Ok(response::ok(order, "QR data saved"))
}

/// POST /api/orders/{id}/rate
pub async fn rate_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    path: web::Path<Uuid>,
    body: web::Json<RateOrder>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::rate_order(
        db.get_ref(),
        policy.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(response::ok(order, "Thanks for your feedback"))
}

/// POST /api/orders/{id}/accept: provider confirms.
pub async fn accept_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::accept_order(db.get_ref(), &user.0, path.into_inner()).await?;
    Ok(response::ok(order, "Order accepted"))
}

/// POST /api/orders/{id}/reject: provider declines.
pub async fn reject_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::reject_order(db.get_ref(), &user.0, path.into_inner()).await?;
    Ok(response::ok(order, "Order rejected"))
}

/// POST /api/orders/{id}/cancel: customer withdraws a scheduled order.
pub async fn cancel_order(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::cancel_order(db.get_ref(), &user.0, path.into_inner()).await?;
    Ok(response::ok(order, "Order cancelled"))
}

/// PATCH /api/orders/{id}/status: any legal transition for the caller.
pub async fn update_status(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOrderStatus>,
) -> Result<HttpResponse, AppError> {
    let order = order_service::transition(
        db.get_ref(),
        &user.0,
        path.into_inner(),
        body.into_inner().status,
        None,
    )
    .await?;
    Ok(response::ok(order, "Order status updated"))
}
