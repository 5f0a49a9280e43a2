use sea_orm::DatabaseConnection;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::authorization::verify_order_owner;
use crate::config::LifecyclePolicy;
use crate::errors::AppError;
use crate::models::orders::{OrderStatus, PlacedOrder, ReorderRequest};
use crate::models::users;
use crate::services::checkout::{self, OrderDraft, normalize_code};

/// Place a fresh order from the line items snapshotted on a previous one.
///
/// A new scheduled order is created from the same lines, and the caller's
/// cart is overwritten with them in the same transaction. If the order
/// fails, the cart is left as it was.
/// Payment method and location default to the previous order's unless the
/// request overrides them. A voucher applies only when the request names one,
/// and the previous status is never copied.
#[instrument(skip(db, policy, user, req), fields(user_id = %user.id))]
pub async fn reorder(
    db: &DatabaseConnection,
    policy: &LifecyclePolicy,
    user: &users::Model,
    req: ReorderRequest,
) -> Result<PlacedOrder, AppError> {
    let order_id = req
        .order_id
        .ok_or_else(|| AppError::validation("order_id is required."))?;
    let previous = verify_order_owner(db, order_id, user.id).await?;

    let lines = previous.line_items.0.clone();
    if lines.is_empty() {
        return Err(AppError::not_found("Previous order has no items to reorder."));
    }

    let (provider_ids, catalog) = checkout::resolve_lines(db, &lines).await?;
    let subtotal = checkout::resolve_subtotal(policy, previous.subtotal, &lines, &catalog)?;

    let schedule = req.schedule_info.complete().or_else(|| {
        previous
            .schedule_date
            .zip(previous.schedule_time_slot.clone())
    });

    let placed = checkout::persist_order(
        db,
        OrderDraft {
            id: Uuid::new_v4(),
            user_id: user.id,
            service_id: previous.service_id,
            cart_id: None,
            task_id: None,
            offer_id: None,
            refill_cart: true,
            line_items: lines,
            provider_ids,
            payment_method_id: req.payment_method.unwrap_or(previous.payment_method_id),
            checkout_info: previous.checkout_info.clone(),
            driver_instruction: previous.driver_instruction.clone(),
            location: req
                .location
                .filter(|l| !l.trim().is_empty())
                .or(previous.location.clone()),
            subtotal,
            voucher_code: normalize_code(req.voucher_code),
            promo_code: previous.promo_code.clone(),
            allergies: previous.allergies.clone(),
            status: OrderStatus::Scheduled,
            schedule,
            confirmation: false,
        },
    )
    .await?;

    info!(%order_id, new_order_id = %placed.order.order.id, "Order reordered");
    Ok(placed)
}
