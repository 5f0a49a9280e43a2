#![allow(dead_code)]

use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, Set};
use serde_json::json;
use uuid::Uuid;

use heroes_backend::db;
use heroes_backend::models::checkout::CheckoutFields;
use heroes_backend::models::orders::{PlaceOrderRequest, ScheduleOrderRequest};
use heroes_backend::models::services;
use heroes_backend::models::users::{self, CreateUserFromAuth, Roles};
use heroes_backend::models::vouchers;

pub const PIN: &str = "1234";

/// Fresh in-memory database with the real schema.
///
/// A single pooled connection keeps every query on the same in-memory database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opts).await.expect("connect to sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn create_user(db: &DatabaseConnection, role: Roles) -> users::Model {
    db::users::find_or_create_from_auth(
        db,
        CreateUserFromAuth {
            id: Uuid::new_v4(),
            email: None,
            role,
        },
    )
    .await
    .expect("create user")
}

/// A customer with PIN, biometrics and identity document on file.
pub async fn create_verified_user(db: &DatabaseConnection, role: Roles) -> users::Model {
    let user = create_user(db, role).await;

    let mut active: users::ActiveModel = user.into();
    active.pin = Set(Some(PIN.to_string()));
    active.is_pin_verified = Set(true);
    active.biometric_enabled = Set(true);
    active.identity_document = Set(Some("passport-4471".to_string()));
    active.update(db).await.expect("verify user")
}

pub async fn create_service(
    db: &DatabaseConnection,
    provider: Option<Uuid>,
    price: Option<f64>,
) -> services::Model {
    services::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set("House cleaning".to_string()),
        description: Set(None),
        price: Set(price),
        provider_user_id: Set(provider),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("create service")
}

pub async fn create_voucher(
    db: &DatabaseConnection,
    code: &str,
    discount: f64,
    expires_at: Option<DateTime<Utc>>,
    usage_limit: Option<i32>,
) -> vouchers::Model {
    vouchers::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        discount: Set(discount),
        expires_at: Set(expires_at),
        usage_limit: Set(usage_limit),
        used_count: Set(0),
        created_at: Set(Utc::now()),
    }
    .insert(db)
    .await
    .expect("create voucher")
}

pub async fn used_count(db: &DatabaseConnection, code: &str) -> i32 {
    db::vouchers::get_voucher_by_code(db, code)
        .await
        .expect("query voucher")
        .expect("voucher exists")
        .used_count
}

pub fn delivery_checkout() -> CheckoutFields {
    serde_json::from_value(json!({
        "checkout_type": "delivery",
        "delivery_info": { "delivery_address": "12 Harbour Rd", "delivery_options": "standard" }
    }))
    .expect("checkout fields")
}

pub fn place_request(service_id: Uuid, total: f64, voucher: Option<&str>) -> PlaceOrderRequest {
    serde_json::from_value(json!({
        "checkoutType": "delivery",
        "deliveryInfo": [{ "deliveryAddress": "12 Harbour Rd" }],
        "totalPayment": total,
        "voucherCode": voucher,
        "payment_method": Uuid::new_v4(),
        "service_id": service_id,
        "pin": PIN,
    }))
    .expect("place order request")
}

pub fn schedule_request(total: f64) -> ScheduleOrderRequest {
    serde_json::from_value(json!({
        "checkout_type": "pickup",
        "pickup_info": { "pickup_address": "Depot 4" },
        "total_payment": total,
        "payment_method": Uuid::new_v4(),
        "location": "Harbour district",
        "ScheduleInfo": {
            "ScheduleDate": "2026-11-02T09:00:00Z",
            "ScheduleTimeSlot": "09:00-11:00"
        },
        "pin": PIN,
    }))
    .expect("schedule order request")
}
