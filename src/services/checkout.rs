//! The order-creation path shared by place, schedule, reorder and task checkout.
//!
//! Every caller builds an [`OrderDraft`] and hands it to [`persist_order`],
//! which redeems the voucher, inserts the order and its provider rows (and,
//! for task checkout, claims the task; for reorder, refills the cart) inside
//! one transaction. Any failure rolls the whole thing back, including the
//! voucher's use count.

use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use std::collections::HashMap;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::LifecyclePolicy;
use crate::db;
use crate::db::orders::NewOrder;
use crate::errors::AppError;
use crate::models::checkout::{CheckoutDetails, DriverInstructions};
use crate::models::orders::{OrderLine, OrderResponse, OrderStatus, PlacedOrder};
use crate::models::services;
use crate::models::tasks::TaskStatus;
use crate::models::users;
use crate::services::vouchers::{self, DiscountBreakdown};

/// Everything needed to create an order, before the discount is known.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    /// Set for task checkout; the task is moved from open to accepted with the order.
    pub task_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    /// Overwrite the owner's cart with `line_items` in the same transaction;
    /// `cart_id` is then taken from that cart.
    pub refill_cart: bool,
    pub line_items: Vec<OrderLine>,
    pub provider_ids: Vec<Uuid>,
    pub payment_method_id: Uuid,
    pub checkout_info: CheckoutDetails,
    pub driver_instruction: Option<DriverInstructions>,
    pub location: Option<String>,
    pub subtotal: f64,
    pub voucher_code: Option<String>,
    pub promo_code: Option<String>,
    pub allergies: Option<String>,
    pub status: OrderStatus,
    pub schedule: Option<(chrono::DateTime<chrono::Utc>, String)>,
    pub confirmation: bool,
}

pub fn ensure_profile_verified(user: &users::Model) -> Result<(), AppError> {
    if user.is_profile_verified() {
        Ok(())
    } else {
        Err(AppError::ProfileNotVerified)
    }
}

pub fn ensure_pin(user: &users::Model, pin: Option<&str>) -> Result<(), AppError> {
    let pin = pin
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::validation("pin is required."))?;
    if user.pin_matches(pin) {
        Ok(())
    } else {
        Err(AppError::InvalidPin)
    }
}

/// A client-supplied amount must be a positive, finite number.
pub fn positive_amount(value: Option<f64>, field: &str) -> Result<f64, AppError> {
    value
        .filter(|v| v.is_finite() && *v > 0.0)
        .ok_or_else(|| AppError::validation(format!("{field} must be a positive number.")))
}

/// Trim an optional code, treating blank as absent.
pub fn normalize_code(code: Option<String>) -> Option<String> {
    code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty())
}

/// Distinct ids in first-seen order.
pub fn distinct_providers(ids: impl IntoIterator<Item = Uuid>) -> Vec<Uuid> {
    let mut out: Vec<Uuid> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

/// Resolve every line's service and its provider.
///
/// Returns the distinct provider ids and the services keyed by id. A missing
/// service or a service with no provider is an integrity fault and fails.
pub async fn resolve_lines<C: ConnectionTrait>(
    db: &C,
    lines: &[OrderLine],
) -> Result<(Vec<Uuid>, HashMap<Uuid, services::Model>), AppError> {
    let ids = lines.iter().map(|l| l.service_id).collect();
    let catalog: HashMap<Uuid, services::Model> = db::services::get_services_by_ids(db, ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    let mut providers = Vec::with_capacity(lines.len());
    for line in lines {
        let service = catalog
            .get(&line.service_id)
            .ok_or_else(|| AppError::not_found("Service not found."))?;
        let provider = service
            .provider_user_id
            .ok_or_else(|| AppError::not_found("Provider not found for the service."))?;
        providers.push(provider);
    }

    Ok((distinct_providers(providers), catalog))
}

/// Catalog price of the lines: price × quantity summed.
pub fn catalog_subtotal(
    lines: &[OrderLine],
    catalog: &HashMap<Uuid, services::Model>,
) -> Result<f64, AppError> {
    lines.iter().try_fold(0.0, |acc, line| {
        let price = catalog
            .get(&line.service_id)
            .and_then(|s| s.price)
            .ok_or_else(|| AppError::validation("Service has no price set."))?;
        Ok(acc + price * f64::from(line.quantity))
    })
}

/// The amount the discount applies to: the client's figure when the policy
/// trusts it, otherwise the catalog price of the lines.
pub fn resolve_subtotal(
    policy: &LifecyclePolicy,
    client_total: f64,
    lines: &[OrderLine],
    catalog: &HashMap<Uuid, services::Model>,
) -> Result<f64, AppError> {
    if policy.trust_client_total {
        Ok(client_total)
    } else {
        catalog_subtotal(lines, catalog)
    }
}

/// Redeem, insert and link in one transaction.
#[instrument(skip(db, draft), fields(order_id = %draft.id, user_id = %draft.user_id))]
pub async fn persist_order(
    db: &DatabaseConnection,
    draft: OrderDraft,
) -> Result<PlacedOrder, AppError> {
    let txn = db.begin().await?;
    let txn_ref = &txn;
    let provider_ids = draft.provider_ids.clone();
    let voucher_code = draft.voucher_code.clone();

    let outcome = async move {
        let mut cart_id = draft.cart_id;
        if draft.refill_cart {
            let cart = db::carts::get_or_create_cart(txn_ref, draft.user_id).await?;
            db::carts::replace_items(txn_ref, cart.id, &draft.line_items).await?;
            cart_id = Some(cart.id);
        }

        let breakdown = match draft.voucher_code.as_deref() {
            Some(code) => vouchers::redeem(txn_ref, code, draft.subtotal).await?,
            None => DiscountBreakdown::undiscounted(draft.subtotal),
        };

        if let Some(task_id) = draft.task_id {
            let claimed = db::tasks::transition_status(
                txn_ref,
                task_id,
                TaskStatus::Open,
                TaskStatus::Accepted,
            )
            .await?;
            if !claimed {
                return Err(AppError::state("Task is no longer open."));
            }
        }

        let order = db::orders::insert_order(
            txn_ref,
            NewOrder {
                id: draft.id,
                user_id: draft.user_id,
                service_id: draft.service_id,
                cart_id,
                task_id: draft.task_id,
                offer_id: draft.offer_id,
                line_items: draft.line_items,
                payment_method_id: draft.payment_method_id,
                checkout_info: draft.checkout_info,
                driver_instruction: draft.driver_instruction,
                location: draft.location,
                subtotal: breakdown.total_before_discount,
                discount_amount: breakdown.discount_amount,
                total_price: breakdown.total_after_discount,
                voucher_code: draft.voucher_code,
                promo_code: draft.promo_code,
                allergies: draft.allergies,
                status: draft.status,
                schedule: draft.schedule,
                confirmation: draft.confirmation,
            },
        )
        .await?;
        db::orders::insert_providers(txn_ref, order.id, &draft.provider_ids).await?;

        Ok::<_, AppError>((order, breakdown))
    }
    .await;

    let (order, breakdown) = match outcome {
        Ok(created) => created,
        Err(e) => {
            if let Some(code) = voucher_code.as_deref() {
                warn!(code, "Order not created; voucher redemption rolled back");
            }
            if let Err(rollback_err) = txn.rollback().await {
                error!("Failed to roll back order transaction: {rollback_err}");
            }
            return Err(e);
        }
    };

    txn.commit().await?;

    info!(
        status = ?order.status,
        total = order.total_price,
        providers = provider_ids.len(),
        "Order created"
    );

    Ok(PlacedOrder {
        order: OrderResponse {
            order,
            provider_ids,
        },
        total_before_discount: breakdown.total_before_discount,
        discount_amount: breakdown.discount_amount,
        total_after_discount: breakdown.total_after_discount,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_are_deduplicated_in_first_seen_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(distinct_providers([a, b, a]), vec![a, b]);
        assert_eq!(distinct_providers([b, b, b]), vec![b]);
    }

    #[test]
    fn amounts_must_be_positive() {
        assert!(positive_amount(Some(0.0), "total_payment").is_err());
        assert!(positive_amount(Some(f64::NAN), "total_payment").is_err());
        assert!(positive_amount(None, "total_payment").is_err());
        assert_eq!(positive_amount(Some(42.5), "total_payment").unwrap(), 42.5);
    }

    #[test]
    fn blank_codes_are_absent() {
        assert_eq!(normalize_code(Some("  ".to_string())), None);
        assert_eq!(normalize_code(Some(" SAVE10 ".to_string())), Some("SAVE10".to_string()));
    }

    #[test]
    fn catalog_subtotal_multiplies_quantity() {
        let service_id = Uuid::new_v4();
        let catalog = HashMap::from([(
            service_id,
            services::Model {
                id: service_id,
                title: "Lawn mowing".to_string(),
                description: None,
                price: Some(25.0),
                provider_user_id: Some(Uuid::new_v4()),
                created_at: chrono::Utc::now(),
            },
        )]);
        let lines = vec![OrderLine {
            service_id,
            quantity: 3,
            schedule_time: None,
        }];

        assert_eq!(catalog_subtotal(&lines, &catalog).unwrap(), 75.0);
    }
}
