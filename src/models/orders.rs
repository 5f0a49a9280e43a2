use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::checkout::{CheckoutDetails, CheckoutFields, CheckoutType, DriverInstructions, ScheduleInfo};

/// Order status stored as a lowercase string in the database.
///
/// `Placed` and `Scheduled` are the two initial states. The only legal
/// moves are forward ones; see `policy::is_forward_edge`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[sea_orm(string_value = "scheduled")]
    Scheduled,
    #[sea_orm(string_value = "placed")]
    Placed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

/// One line of an order, snapshotted from the cart at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub service_id: Uuid,
    pub quantity: i32,
    pub schedule_time: Option<DateTimeUtc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct LineItems(pub Vec<OrderLine>);

/// SeaORM entity for the `orders` table.
///
/// `total_price` is always `subtotal - discount_amount`, fixed at creation.
/// Provider ids live in `order_providers`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_id: Option<Uuid>,
    pub cart_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    #[sea_orm(column_type = "JsonBinary")]
    pub line_items: LineItems,
    pub payment_method_id: Uuid,
    pub checkout_type: CheckoutType,
    #[sea_orm(column_type = "JsonBinary")]
    pub checkout_info: CheckoutDetails,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub driver_instruction: Option<DriverInstructions>,
    pub location: Option<String>,
    #[sea_orm(column_type = "Double")]
    pub subtotal: f64,
    #[sea_orm(column_type = "Double")]
    pub discount_amount: f64,
    #[sea_orm(column_type = "Double")]
    pub total_price: f64,
    pub voucher_code: Option<String>,
    pub promo_code: Option<String>,
    pub allergies: Option<String>,
    pub status: OrderStatus,
    pub schedule_date: Option<DateTimeUtc>,
    pub schedule_time_slot: Option<String>,
    pub confirmation: bool,
    pub qr_data: Option<String>,
    pub rating: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_providers::Entity")]
    Providers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::order_providers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Providers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// An order together with the providers backing it.
#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: Model,
    pub provider_ids: Vec<Uuid>,
}

/// Result of a checkout: the order plus the discount breakdown.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order: OrderResponse,
    pub total_before_discount: f64,
    pub discount_amount: f64,
    pub total_after_discount: f64,
}

/// Request body for POST /api/orders/place.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(flatten)]
    pub checkout: CheckoutFields,
    #[serde(alias = "totalPayment", alias = "total_amount", alias = "totalAmount")]
    pub total_payment: Option<f64>,
    #[serde(alias = "voucherCode")]
    pub voucher_code: Option<String>,
    #[serde(alias = "promoCode")]
    pub promo_code: Option<String>,
    pub allergies: Option<String>,
    #[serde(alias = "ScheduleInfo", default)]
    pub schedule_info: ScheduleInfo,
    #[serde(alias = "payment_method_id")]
    pub payment_method: Option<Uuid>,
    #[serde(alias = "service", alias = "serviceId")]
    pub service_id: Option<Uuid>,
    pub location: Option<String>,
    pub pin: Option<String>,
}

/// Request body for POST /api/orders/schedule. Lines come from the caller's cart.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleOrderRequest {
    pub cart_id: Option<Uuid>,
    #[serde(flatten)]
    pub checkout: CheckoutFields,
    #[serde(alias = "totalPayment", alias = "total_price", alias = "total_amount")]
    pub total_payment: Option<f64>,
    #[serde(alias = "voucherCode")]
    pub voucher_code: Option<String>,
    #[serde(alias = "promoCode")]
    pub promo_code: Option<String>,
    pub allergies: Option<String>,
    #[serde(alias = "ScheduleInfo", default)]
    pub schedule_info: ScheduleInfo,
    #[serde(alias = "payment_method_id")]
    pub payment_method: Option<Uuid>,
    #[serde(alias = "location_id")]
    pub location: Option<String>,
    pub pin: Option<String>,
}

/// Request body for POST /api/orders/reorder. Everything but `order_id`
/// defaults to the previous order's values.
#[derive(Debug, Clone, Deserialize)]
pub struct ReorderRequest {
    pub order_id: Option<Uuid>,
    #[serde(alias = "payment_method_id")]
    pub payment_method: Option<Uuid>,
    #[serde(alias = "location_id")]
    pub location: Option<String>,
    #[serde(alias = "voucherCode")]
    pub voucher_code: Option<String>,
    #[serde(alias = "ScheduleInfo", default)]
    pub schedule_info: ScheduleInfo,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> super::PaginationQuery {
        super::PaginationQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateOrder {
    pub rating: Option<i32>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachQr {
    pub qr_data: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackingInfo {
    pub order_id: Uuid,
    pub status: OrderStatus,
    pub estimated_delivery: DateTimeUtc,
    pub current_location: String,
}
