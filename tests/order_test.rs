mod common;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use heroes_backend::config::LifecyclePolicy;
use heroes_backend::errors::AppError;
use heroes_backend::models::carts::{AddCartItem, UpdateCartItem};
use heroes_backend::models::checkout::CheckoutType;
use heroes_backend::models::orders::{OrderListQuery, OrderStatus, PlacedOrder, RateOrder};
use heroes_backend::models::users::{self, Roles};
use heroes_backend::services::{carts, orders};

use common::*;

fn all_orders() -> OrderListQuery {
    OrderListQuery {
        status: None,
        page: None,
        limit: None,
    }
}

async fn fill_cart(db: &DatabaseConnection, user_id: Uuid, service_ids: &[Uuid]) {
    for id in service_ids {
        carts::add_item(db, user_id, AddCartItem { service_id: Some(*id) })
            .await
            .unwrap();
    }
}

/// A scheduled order from a fresh customer to one provider.
async fn scheduled_order(db: &DatabaseConnection) -> (users::Model, users::Model, PlacedOrder) {
    let customer = create_verified_user(db, Roles::Customer).await;
    let provider = create_user(db, Roles::Hero).await;
    let service = create_service(db, Some(provider.id), Some(60.0)).await;
    fill_cart(db, customer.id, &[service.id]).await;

    let placed = orders::schedule_order(db, &LifecyclePolicy::default(), &customer, schedule_request(60.0))
        .await
        .unwrap();
    (customer, provider, placed)
}

#[tokio::test]
async fn place_order_with_voucher_end_to_end() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let customer = create_verified_user(&db, Roles::Customer).await;
    let provider = create_user(&db, Roles::Hero).await;
    let service = create_service(&db, Some(provider.id), Some(100.0)).await;
    create_voucher(&db, "SAVE10", 10.0, None, Some(100)).await;

    let placed = orders::place_order(&db, &policy, &customer, place_request(service.id, 100.0, Some("SAVE10")))
        .await
        .unwrap();

    assert_eq!(placed.total_before_discount, 100.0);
    assert_eq!(placed.discount_amount, 10.0);
    assert_eq!(placed.total_after_discount, 90.0);

    let order = &placed.order.order;
    assert_eq!(placed.order.provider_ids, vec![provider.id]);
    assert_eq!(order.status, OrderStatus::Placed);
    assert!(order.confirmation);
    assert_eq!(order.total_price, 90.0);
    assert_eq!(order.checkout_type, CheckoutType::Delivery);
    assert_eq!(order.voucher_code.as_deref(), Some("SAVE10"));
    assert_eq!(order.service_id, Some(service.id));
    assert_eq!(used_count(&db, "SAVE10").await, 1);

    let mine = orders::list_orders(&db, customer.id, all_orders()).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].order.id, order.id);
}

#[tokio::test]
async fn place_order_gates_on_profile_and_pin() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let provider = create_user(&db, Roles::Hero).await;
    let service = create_service(&db, Some(provider.id), Some(100.0)).await;

    let unverified = create_user(&db, Roles::Customer).await;
    let err = orders::place_order(&db, &policy, &unverified, place_request(service.id, 100.0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ProfileNotVerified));

    let customer = create_verified_user(&db, Roles::Customer).await;

    let mut wrong_pin = place_request(service.id, 100.0, None);
    wrong_pin.pin = Some("9999".to_string());
    let err = orders::place_order(&db, &policy, &customer, wrong_pin).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidPin));

    let mut no_pin = place_request(service.id, 100.0, None);
    no_pin.pin = None;
    let err = orders::place_order(&db, &policy, &customer, no_pin).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    assert!(orders::list_orders(&db, customer.id, all_orders()).await.unwrap().is_empty());
}

#[tokio::test]
async fn place_order_validates_service_and_amount() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let customer = create_verified_user(&db, Roles::Customer).await;

    let mut missing = place_request(Uuid::new_v4(), 100.0, None);
    missing.service_id = None;
    let err = orders::place_order(&db, &policy, &customer, missing).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = orders::place_order(&db, &policy, &customer, place_request(Uuid::new_v4(), 100.0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let orphan = create_service(&db, None, Some(100.0)).await;
    let err = orders::place_order(&db, &policy, &customer, place_request(orphan.id, 100.0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = orders::place_order(&db, &policy, &customer, place_request(orphan.id, -5.0, None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn unknown_voucher_leaves_no_order_behind() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let customer = create_verified_user(&db, Roles::Customer).await;
    let provider = create_user(&db, Roles::Hero).await;
    let service = create_service(&db, Some(provider.id), Some(100.0)).await;

    let err = orders::place_order(&db, &policy, &customer, place_request(service.id, 100.0, Some("GHOST")))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::NotFound(_)));
    assert!(orders::list_orders(&db, customer.id, all_orders()).await.unwrap().is_empty());
}

#[tokio::test]
async fn untrusted_total_is_recomputed_from_catalog() {
    let db = setup_db().await;
    let policy = LifecyclePolicy {
        trust_client_total: false,
        ..LifecyclePolicy::default()
    };
    let customer = create_verified_user(&db, Roles::Customer).await;
    let provider = create_user(&db, Roles::Hero).await;
    let service = create_service(&db, Some(provider.id), Some(100.0)).await;

    let placed = orders::place_order(&db, &policy, &customer, place_request(service.id, 1.0, None))
        .await
        .unwrap();
    assert_eq!(placed.total_before_discount, 100.0);

    let view = carts::add_item(&db, customer.id, AddCartItem { service_id: Some(service.id) })
        .await
        .unwrap();
    carts::update_item(
        &db,
        customer.id,
        UpdateCartItem {
            item_id: Some(view.items[0].item.id),
            quantity: Some(2),
            schedule_time: None,
        },
    )
    .await
    .unwrap();

    let placed = orders::schedule_order(&db, &policy, &customer, schedule_request(1.0))
        .await
        .unwrap();
    assert_eq!(placed.total_before_discount, 200.0);
}

#[tokio::test]
async fn schedule_order_collects_distinct_providers() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let customer = create_verified_user(&db, Roles::Customer).await;
    let a = create_user(&db, Roles::Hero).await;
    let b = create_user(&db, Roles::Hero).await;
    let a1 = create_service(&db, Some(a.id), Some(10.0)).await;
    let b1 = create_service(&db, Some(b.id), Some(20.0)).await;
    let a2 = create_service(&db, Some(a.id), Some(30.0)).await;
    fill_cart(&db, customer.id, &[a1.id, b1.id, a2.id]).await;

    let placed = orders::schedule_order(&db, &policy, &customer, schedule_request(60.0))
        .await
        .unwrap();

    let mut providers = placed.order.provider_ids.clone();
    providers.sort();
    let mut expected = vec![a.id, b.id];
    expected.sort();
    assert_eq!(providers, expected);

    let order = &placed.order.order;
    assert_eq!(order.status, OrderStatus::Scheduled);
    assert!(!order.confirmation);
    assert_eq!(order.line_items.0.len(), 3);
    assert_eq!(order.location.as_deref(), Some("Harbour district"));
    assert_eq!(order.schedule_time_slot.as_deref(), Some("09:00-11:00"));
    assert_eq!(order.checkout_type, CheckoutType::Pickup);

    for provider in [&a, &b] {
        let listed = orders::list_provider_orders(&db, provider.id, all_orders()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].order.id, order.id);
    }
}

#[tokio::test]
async fn schedule_order_needs_a_non_empty_cart() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let customer = create_verified_user(&db, Roles::Customer).await;

    let err = orders::schedule_order(&db, &policy, &customer, schedule_request(50.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let service = create_service(&db, None, Some(50.0)).await;
    let view = carts::add_item(&db, customer.id, AddCartItem { service_id: Some(service.id) })
        .await
        .unwrap();
    carts::remove_item(&db, customer.id, view.items[0].item.id).await.unwrap();

    let err = orders::schedule_order(&db, &policy, &customer, schedule_request(50.0))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn provider_accepts_then_completes() {
    let db = setup_db().await;
    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::accept_order(&db, &customer, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let accepted = orders::accept_order(&db, &provider, order_id).await.unwrap();
    assert_eq!(accepted.order.status, OrderStatus::Placed);
    assert!(accepted.order.confirmation);

    let completed = orders::transition(&db, &provider, order_id, OrderStatus::Completed, None)
        .await
        .unwrap();
    assert_eq!(completed.order.status, OrderStatus::Completed);

    let err = orders::cancel_order(&db, &customer, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}

#[tokio::test]
async fn provider_rejects_a_scheduled_order() {
    let db = setup_db().await;
    let (_, provider, placed) = scheduled_order(&db).await;

    let rejected = orders::reject_order(&db, &provider, placed.order.order.id)
        .await
        .unwrap();

    assert_eq!(rejected.order.status, OrderStatus::Cancelled);
    assert!(!rejected.order.confirmation);
}

#[tokio::test]
async fn customer_cancels_only_before_pickup() {
    let db = setup_db().await;
    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let cancelled = orders::cancel_order(&db, &customer, order_id).await.unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);

    let err = orders::accept_order(&db, &provider, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;
    orders::accept_order(&db, &provider, order_id).await.unwrap();

    let err = orders::cancel_order(&db, &customer, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));
}

#[tokio::test]
async fn admin_may_take_any_legal_edge() {
    let db = setup_db().await;
    let admin = create_user(&db, Roles::Admin).await;
    let (_, _, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::transition(&db, &admin, order_id, OrderStatus::Completed, None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    let placed = orders::transition(&db, &admin, order_id, OrderStatus::Placed, None)
        .await
        .unwrap();
    assert_eq!(placed.order.status, OrderStatus::Placed);
}

#[tokio::test]
async fn accept_and_reject_check_the_caller_before_moving() {
    let db = setup_db().await;
    let admin = create_user(&db, Roles::Admin).await;
    let stranger = create_user(&db, Roles::Hero).await;
    let (_, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::accept_order(&db, &stranger, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));
    let err = orders::accept_order(&db, &admin, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let accepted = orders::accept_order(&db, &admin, order_id).await.unwrap();
    assert_eq!(accepted.order.status, OrderStatus::Placed);
    assert!(accepted.order.confirmation);
    assert_eq!(accepted.provider_ids, vec![provider.id]);

    let rejected = orders::reject_order(&db, &provider, order_id).await.unwrap();
    assert_eq!(rejected.order.status, OrderStatus::Cancelled);
    assert!(!rejected.order.confirmation);
}

#[tokio::test]
async fn only_the_customer_rates() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::rate_order(&db, &policy, &customer, order_id, RateOrder { rating: Some(6), feedback: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = orders::rate_order(&db, &policy, &provider, order_id, RateOrder { rating: Some(4), feedback: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let rated = orders::rate_order(
        &db,
        &policy,
        &customer,
        order_id,
        RateOrder {
            rating: Some(5),
            feedback: Some("Spotless work".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(rated.order.rating, Some(5));
    assert_eq!(rated.order.feedback.as_deref(), Some("Spotless work"));
}

#[tokio::test]
async fn rating_can_require_completion() {
    let db = setup_db().await;
    let policy = LifecyclePolicy {
        rate_only_completed: true,
        ..LifecyclePolicy::default()
    };
    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::rate_order(&db, &policy, &customer, order_id, RateOrder { rating: Some(4), feedback: None })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    orders::accept_order(&db, &provider, order_id).await.unwrap();
    orders::transition(&db, &provider, order_id, OrderStatus::Completed, None)
        .await
        .unwrap();

    let rated = orders::rate_order(&db, &policy, &customer, order_id, RateOrder { rating: Some(4), feedback: None })
        .await
        .unwrap();
    assert_eq!(rated.order.rating, Some(4));
}

#[tokio::test]
async fn strangers_cannot_see_an_order() {
    let db = setup_db().await;
    let stranger = create_user(&db, Roles::Customer).await;
    let (customer, provider, placed) = scheduled_order(&db).await;
    let order_id = placed.order.order.id;

    let err = orders::get_order(&db, &stranger, order_id).await.unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = orders::get_order(&db, &customer, Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let seen = orders::get_order(&db, &provider, order_id).await.unwrap();
    assert_eq!(seen.provider_ids, vec![provider.id]);

    let tracking = orders::track_order(&db, &customer, order_id).await.unwrap();
    assert_eq!(tracking.current_location, "Dispatch Center");
    assert_eq!(tracking.status, OrderStatus::Scheduled);
}

#[tokio::test]
async fn list_orders_filters_by_status() {
    let db = setup_db().await;
    let (customer, provider, first) = scheduled_order(&db).await;
    orders::accept_order(&db, &provider, first.order.order.id).await.unwrap();

    let service = create_service(&db, Some(provider.id), Some(20.0)).await;
    fill_cart(&db, customer.id, &[service.id]).await;
    orders::schedule_order(&db, &LifecyclePolicy::default(), &customer, schedule_request(80.0))
        .await
        .unwrap();

    let scheduled = orders::list_orders(
        &db,
        customer.id,
        OrderListQuery {
            status: Some(OrderStatus::Scheduled),
            page: None,
            limit: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].order.status, OrderStatus::Scheduled);

    let everything = orders::list_orders(&db, customer.id, all_orders()).await.unwrap();
    assert_eq!(everything.len(), 2);
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let db = setup_db().await;
    let (customer, provider, _) = scheduled_order(&db).await;

    let beyond = OrderListQuery {
        status: None,
        page: Some(u64::MAX),
        limit: Some(100),
    };
    let mine = orders::list_orders(&db, customer.id, beyond.clone()).await.unwrap();
    assert!(mine.is_empty());
    let theirs = orders::list_provider_orders(&db, provider.id, beyond).await.unwrap();
    assert!(theirs.is_empty());
}
