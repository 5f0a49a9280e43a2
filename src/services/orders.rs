use chrono::{Duration, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::auth::authorization::{OrderParty, verify_order_party};
use crate::config::LifecyclePolicy;
use crate::db;
use crate::errors::AppError;
use crate::models::orders::{
    self, AttachQr, OrderLine, OrderListQuery, OrderResponse, OrderStatus, PlaceOrderRequest,
    PlacedOrder, RateOrder, ScheduleOrderRequest, TrackingInfo,
};
use crate::models::users;
use crate::policy::{self, Actor};
use crate::services::checkout::{
    self, OrderDraft, ensure_pin, ensure_profile_verified, normalize_code, positive_amount,
};

const DISPATCH_LOCATION: &str = "Dispatch Center";

/// Check out a single catalog service.
#[instrument(skip(db, policy, user, req), fields(user_id = %user.id))]
pub async fn place_order(
    db: &DatabaseConnection,
    policy: &LifecyclePolicy,
    user: &users::Model,
    req: PlaceOrderRequest,
) -> Result<PlacedOrder, AppError> {
    ensure_profile_verified(user)?;

    if req.checkout.checkout_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(AppError::validation("checkout_type is required."));
    }
    let total_payment = positive_amount(req.total_payment, "total_payment")?;
    let payment_method_id = req
        .payment_method
        .ok_or_else(|| AppError::validation("payment_method is required."))?;
    let service_id = req
        .service_id
        .ok_or_else(|| AppError::validation("service_id is required."))?;

    ensure_pin(user, req.pin.as_deref())?;

    let driver_instruction = req.checkout.driver_instructions();
    let checkout_info = req.checkout.into_details()?;

    let service = db::services::get_service_by_id(db, service_id)
        .await?
        .ok_or_else(|| AppError::not_found("Service not found."))?;
    let provider_id = service
        .provider_user_id
        .ok_or_else(|| AppError::not_found("Provider not found for the service."))?;

    let line_items = vec![OrderLine {
        service_id,
        quantity: 1,
        schedule_time: None,
    }];
    let subtotal = if policy.trust_client_total {
        total_payment
    } else {
        service
            .price
            .ok_or_else(|| AppError::validation("Service has no price set."))?
    };

    checkout::persist_order(
        db,
        OrderDraft {
            id: Uuid::new_v4(),
            user_id: user.id,
            service_id: Some(service_id),
            cart_id: None,
            task_id: None,
            offer_id: None,
            refill_cart: false,
            line_items,
            provider_ids: vec![provider_id],
            payment_method_id,
            checkout_info,
            driver_instruction,
            location: req.location,
            subtotal,
            voucher_code: normalize_code(req.voucher_code),
            promo_code: normalize_code(req.promo_code),
            allergies: req.allergies,
            status: OrderStatus::Placed,
            schedule: req.schedule_info.complete(),
            confirmation: true,
        },
    )
    .await
}

/// Check out the caller's cart for a future date. The provider confirms later.
#[instrument(skip(db, policy, user, req), fields(user_id = %user.id))]
pub async fn schedule_order(
    db: &DatabaseConnection,
    policy: &LifecyclePolicy,
    user: &users::Model,
    req: ScheduleOrderRequest,
) -> Result<PlacedOrder, AppError> {
    ensure_profile_verified(user)?;

    if req.checkout.checkout_type.as_deref().is_none_or(|t| t.trim().is_empty()) {
        return Err(AppError::validation("checkout_type is required."));
    }
    let total_payment = positive_amount(req.total_payment, "total_payment")?;
    let payment_method_id = req
        .payment_method
        .ok_or_else(|| AppError::validation("payment_method is required."))?;
    let location = req
        .location
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::validation("location is required."))?;
    let schedule = req
        .schedule_info
        .complete()
        .ok_or_else(|| AppError::validation("schedule date and time slot are required."))?;

    ensure_pin(user, req.pin.as_deref())?;

    let driver_instruction = req.checkout.driver_instructions();
    let checkout_info = req.checkout.into_details()?;

    let cart = db::carts::get_cart_by_user(db, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("Cart not found."))?;
    if req.cart_id.is_some_and(|id| id != cart.id) {
        return Err(AppError::not_found("Cart not found."));
    }

    let line_items: Vec<OrderLine> = db::carts::get_items(db, cart.id)
        .await?
        .into_iter()
        .map(|item| OrderLine {
            service_id: item.service_id,
            quantity: item.quantity,
            schedule_time: item.schedule_time,
        })
        .collect();
    if line_items.is_empty() {
        return Err(AppError::validation("Cart is empty."));
    }

    let (provider_ids, catalog) = checkout::resolve_lines(db, &line_items).await?;
    let subtotal = checkout::resolve_subtotal(policy, total_payment, &line_items, &catalog)?;

    checkout::persist_order(
        db,
        OrderDraft {
            id: Uuid::new_v4(),
            user_id: user.id,
            service_id: None,
            cart_id: Some(cart.id),
            task_id: None,
            offer_id: None,
            refill_cart: false,
            line_items,
            provider_ids,
            payment_method_id,
            checkout_info,
            driver_instruction,
            location: Some(location),
            subtotal,
            voucher_code: normalize_code(req.voucher_code),
            promo_code: normalize_code(req.promo_code),
            allergies: req.allergies,
            status: OrderStatus::Scheduled,
            schedule: Some(schedule),
            confirmation: false,
        },
    )
    .await
}

async fn with_providers<C: ConnectionTrait>(
    db: &C,
    list: Vec<orders::Model>,
) -> Result<Vec<OrderResponse>, AppError> {
    let ids: Vec<Uuid> = list.iter().map(|o| o.id).collect();
    let mut providers = db::orders::get_provider_ids_for_orders(db, &ids).await?;

    Ok(list
        .into_iter()
        .map(|order| OrderResponse {
            provider_ids: providers.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}

#[instrument(skip(db, query))]
pub async fn list_orders<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    query: OrderListQuery,
) -> Result<Vec<OrderResponse>, AppError> {
    let page = query.pagination();
    let list = db::orders::get_orders_by_user(
        db,
        user_id,
        query.status,
        page.offset(),
        page.limit(),
    )
    .await?;
    with_providers(db, list).await
}

#[instrument(skip(db, query))]
pub async fn list_provider_orders<C: ConnectionTrait>(
    db: &C,
    provider_id: Uuid,
    query: OrderListQuery,
) -> Result<Vec<OrderResponse>, AppError> {
    let page = query.pagination();
    let list = db::orders::get_orders_for_provider(
        db,
        provider_id,
        query.status,
        page.offset(),
        page.limit(),
    )
    .await?;
    with_providers(db, list).await
}

pub async fn get_order<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<OrderResponse, AppError> {
    let OrderParty {
        order,
        provider_ids,
        ..
    } = verify_order_party(db, order_id, user).await?;

    Ok(OrderResponse {
        order,
        provider_ids,
    })
}

/// Tracking snapshot. There is no live courier feed; the estimate is a fixed two hours out.
pub async fn track_order<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<TrackingInfo, AppError> {
    let party = verify_order_party(db, order_id, user).await?;

    Ok(TrackingInfo {
        order_id: party.order.id,
        status: party.order.status,
        estimated_delivery: Utc::now() + Duration::hours(2),
        current_location: DISPATCH_LOCATION.to_string(),
    })
}

#[instrument(skip(db, user, input), fields(user_id = %user.id))]
pub async fn attach_qr<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
    input: AttachQr,
) -> Result<OrderResponse, AppError> {
    let qr_data = input
        .qr_data
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::validation("qr_data is required."))?;

    let party = verify_order_party(db, order_id, user).await?;
    let order = db::orders::set_qr_data(db, party.order, qr_data).await?;

    Ok(OrderResponse {
        order,
        provider_ids: party.provider_ids,
    })
}

/// Only the customer who placed the order may rate it.
#[instrument(skip(db, policy, user, input), fields(user_id = %user.id))]
pub async fn rate_order<C: ConnectionTrait>(
    db: &C,
    policy: &LifecyclePolicy,
    user: &users::Model,
    order_id: Uuid,
    input: RateOrder,
) -> Result<OrderResponse, AppError> {
    let rating = input
        .rating
        .filter(|r| (1..=5).contains(r))
        .ok_or_else(|| AppError::validation("rating must be between 1 and 5."))?;

    let order = db::orders::get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
    if order.user_id != user.id {
        return Err(AppError::forbidden("Only the customer who placed this order can rate it."));
    }
    if policy.rate_only_completed && order.status != OrderStatus::Completed {
        return Err(AppError::state("Only completed orders can be rated."));
    }

    let feedback = input.feedback.filter(|f| !f.trim().is_empty());
    let order = db::orders::set_rating(db, order, rating, feedback).await?;
    let provider_ids = db::orders::get_provider_ids(db, order.id).await?;

    info!(%order_id, rating, "Order rated");
    Ok(OrderResponse {
        order,
        provider_ids,
    })
}

/// Move an order to `to`, consulting the transition policy first.
#[instrument(skip(db, user), fields(user_id = %user.id))]
pub async fn transition<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
    to: OrderStatus,
    confirmation: Option<bool>,
) -> Result<OrderResponse, AppError> {
    let party = verify_order_party(db, order_id, user).await?;
    apply_transition(db, party, to, confirmation).await
}

/// Provider confirms: the order is placed and marked confirmed.
#[instrument(skip(db, user), fields(user_id = %user.id))]
pub async fn accept_order<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<OrderResponse, AppError> {
    let party = provider_side(db, user, order_id).await?;
    apply_transition(db, party, OrderStatus::Placed, Some(true)).await
}

/// Provider declines: the order is cancelled and unconfirmed.
#[instrument(skip(db, user), fields(user_id = %user.id))]
pub async fn reject_order<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<OrderResponse, AppError> {
    let party = provider_side(db, user, order_id).await?;
    apply_transition(db, party, OrderStatus::Cancelled, Some(false)).await
}

/// Customer withdraws an order nobody has picked up yet.
pub async fn cancel_order<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<OrderResponse, AppError> {
    transition(db, user, order_id, OrderStatus::Cancelled, None).await
}

async fn provider_side<C: ConnectionTrait>(
    db: &C,
    user: &users::Model,
    order_id: Uuid,
) -> Result<OrderParty, AppError> {
    let party = verify_order_party(db, order_id, user).await?;
    if party.actor == Actor::Owner {
        return Err(AppError::forbidden(
            "Only a provider on this order can accept or reject it.",
        ));
    }
    Ok(party)
}

async fn apply_transition<C: ConnectionTrait>(
    db: &C,
    party: OrderParty,
    to: OrderStatus,
    confirmation: Option<bool>,
) -> Result<OrderResponse, AppError> {
    let order_id = party.order.id;
    let from = party.order.status;

    if let Err(e) = policy::check_transition(from, to, party.actor) {
        warn!(%order_id, ?from, ?to, actor = ?party.actor, "Order transition refused");
        return Err(e);
    }

    if !db::orders::transition_status(db, order_id, from, to, confirmation).await? {
        warn!(%order_id, ?from, ?to, "Order changed status concurrently");
        return Err(AppError::state("Order status changed; reload and try again."));
    }

    let order = db::orders::get_order_by_id(db, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    info!(%order_id, ?from, ?to, "Order status changed");
    Ok(OrderResponse {
        order,
        provider_ids: party.provider_ids,
    })
}
