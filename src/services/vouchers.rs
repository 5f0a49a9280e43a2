use chrono::{DateTime, Utc};
use sea_orm::ConnectionTrait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::db;
use crate::errors::AppError;
use crate::models::vouchers;

/// How a percentage voucher changes a base amount.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountBreakdown {
    pub total_before_discount: f64,
    pub discount_amount: f64,
    pub total_after_discount: f64,
}

impl DiscountBreakdown {
    pub fn compute(base: f64, percent: f64) -> Self {
        let discount_amount = base * percent / 100.0;
        Self {
            total_before_discount: base,
            discount_amount,
            total_after_discount: base - discount_amount,
        }
    }

    pub fn undiscounted(base: f64) -> Self {
        Self {
            total_before_discount: base,
            discount_amount: 0.0,
            total_after_discount: base,
        }
    }
}

/// Response of the voucher preview endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherQuote {
    pub code: String,
    pub discount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown: Option<DiscountBreakdown>,
}

fn classify(voucher: &vouchers::Model, now: DateTime<Utc>) -> Result<(), AppError> {
    if voucher.is_expired(now) {
        return Err(AppError::Expired);
    }
    if voucher.is_exhausted() {
        return Err(AppError::LimitReached);
    }
    Ok(())
}

/// Look up a voucher and check it is usable right now. Does not consume a use.
pub async fn validate<C: ConnectionTrait>(
    db: &C,
    code: &str,
    now: DateTime<Utc>,
) -> Result<vouchers::Model, AppError> {
    let voucher = db::vouchers::get_voucher_by_code(db, code)
        .await?
        .ok_or_else(|| AppError::not_found("Voucher code not found."))?;

    classify(&voucher, now)?;
    Ok(voucher)
}

/// Preview a voucher without redeeming it.
#[instrument(skip(db))]
pub async fn preview<C: ConnectionTrait>(
    db: &C,
    code: Option<String>,
    amount: Option<f64>,
) -> Result<VoucherQuote, AppError> {
    let code = code
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::validation("voucher_code is required."))?;
    if let Some(amount) = amount {
        if !amount.is_finite() || amount < 0.0 {
            return Err(AppError::validation("amount must be a non-negative number."));
        }
    }

    let voucher = validate(db, &code, Utc::now()).await?;

    Ok(VoucherQuote {
        code: voucher.code,
        discount: voucher.discount,
        breakdown: amount.map(|base| DiscountBreakdown::compute(base, voucher.discount)),
    })
}

/// Consume one use of `code` and price `base` with it.
///
/// The usability checks are repeated by the conditional update itself, so a
/// voucher exhausted between an earlier preview and this call is refused.
#[instrument(skip(db))]
pub async fn redeem<C: ConnectionTrait>(
    db: &C,
    code: &str,
    base: f64,
) -> Result<DiscountBreakdown, AppError> {
    let now = Utc::now();
    let voucher = validate(db, code, now).await?;

    if !db::vouchers::try_increment(db, code, now).await? {
        // Lost a race, or the voucher changed under us; find out which.
        let current = db::vouchers::get_voucher_by_code(db, code)
            .await?
            .ok_or_else(|| AppError::not_found("Voucher code not found."))?;
        classify(&current, now)?;
        warn!(code, "Voucher increment refused without a classifiable cause");
        return Err(AppError::LimitReached);
    }

    info!(code, discount = voucher.discount, "Voucher redeemed");
    Ok(DiscountBreakdown::compute(base, voucher.discount))
}
