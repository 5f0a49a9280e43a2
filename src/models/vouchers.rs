use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `vouchers` table.
///
/// `used_count` only ever moves through the guarded increment in
/// `db::vouchers::try_increment`; a failed order rolls it back with its transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vouchers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    /// Percentage off, e.g. `10.0` for 10%.
    #[sea_orm(column_type = "Double")]
    pub discount: f64,
    pub expires_at: Option<DateTimeUtc>,
    pub usage_limit: Option<i32>,
    pub used_count: i32,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn is_expired(&self, now: DateTimeUtc) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    pub fn is_exhausted(&self) -> bool {
        self.usage_limit.is_some_and(|limit| self.used_count >= limit)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for POST /api/voucher/apply.
#[derive(Debug, Clone, Deserialize)]
pub struct ApplyVoucher {
    #[serde(alias = "voucherCode")]
    pub voucher_code: Option<String>,
    pub amount: Option<f64>,
}
