use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::config::LifecyclePolicy;
use crate::errors::AppError;
use crate::models::offers::{CreateOffer, OfferDecision, UpdateOfferPrice};
use crate::response;
use crate::services::offers as offer_service;

/// POST /api/offers: bid on a task.
pub async fn create_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateOffer>,
) -> Result<HttpResponse, AppError> {
    let offer = offer_service::create_offer(db.get_ref(), user.0.id, body.into_inner()).await?;
    Ok(response::created(offer, "Offer created successfully"))
}

/// PUT /api/offers/{id}/price
pub async fn update_price(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateOfferPrice>,
) -> Result<HttpResponse, AppError> {
    let offer =
        offer_service::update_price(db.get_ref(), user.0.id, path.into_inner(), body.into_inner())
            .await?;
    Ok(response::ok(offer, "Offer price updated"))
}

/// POST /api/offers/{id}/accept
pub async fn accept_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    path: web::Path<Uuid>,
    body: web::Json<OfferDecision>,
) -> Result<HttpResponse, AppError> {
    let offer = offer_service::accept_offer(
        db.get_ref(),
        policy.get_ref(),
        user.0.id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(response::ok(offer, "Offer accepted"))
}

/// POST /api/offers/{id}/decline
pub async fn decline_offer(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    policy: web::Data<LifecyclePolicy>,
    path: web::Path<Uuid>,
    body: web::Json<OfferDecision>,
) -> Result<HttpResponse, AppError> {
    let offer = offer_service::decline_offer(
        db.get_ref(),
        policy.get_ref(),
        user.0.id,
        path.into_inner(),
        body.into_inner(),
    )
    .await?;
    Ok(response::ok(offer, "Offer declined"))
}
