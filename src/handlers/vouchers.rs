use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::errors::AppError;
use crate::models::vouchers::ApplyVoucher;
use crate::response;
use crate::services::vouchers as voucher_service;

/// POST /api/voucher/apply: check a code and preview the discount.
/// Nothing is redeemed until an order is created with the code.
pub async fn apply_voucher(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<ApplyVoucher>,
) -> Result<HttpResponse, AppError> {
    let ApplyVoucher {
        voucher_code,
        amount,
    } = body.into_inner();
    let quote = voucher_service::preview(db.get_ref(), voucher_code, amount).await?;
    Ok(response::ok(quote, "Voucher applied successfully"))
}
