use sea_orm::prelude::Expr;
use sea_orm::sea_query::ExprTrait;
use sea_orm::*;

use crate::models::vouchers;

/// Look up a voucher by its exact code.
pub async fn get_voucher_by_code<C: ConnectionTrait>(
    db: &C,
    code: &str,
) -> Result<Option<vouchers::Model>, DbErr> {
    vouchers::Entity::find()
        .filter(vouchers::Column::Code.eq(code))
        .one(db)
        .await
}

/// Consume one use of the voucher if it is unexpired at `now` and still has one left.
///
/// The checks and the increment happen in a single UPDATE, so two
/// concurrent redemptions of the last use cannot both succeed.
pub async fn try_increment<C: ConnectionTrait>(
    db: &C,
    code: &str,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<bool, DbErr> {
    let result = vouchers::Entity::update_many()
        .col_expr(
            vouchers::Column::UsedCount,
            Expr::col(vouchers::Column::UsedCount).add(1),
        )
        .filter(vouchers::Column::Code.eq(code))
        .filter(
            Condition::any()
                .add(vouchers::Column::UsageLimit.is_null())
                .add(Expr::col(vouchers::Column::UsedCount).lt(Expr::col(vouchers::Column::UsageLimit))),
        )
        .filter(
            Condition::any()
                .add(vouchers::Column::ExpiresAt.is_null())
                .add(vouchers::Column::ExpiresAt.gt(now)),
        )
        .exec(db)
        .await?;

    Ok(result.rows_affected == 1)
}
