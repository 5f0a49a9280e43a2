mod common;

use sea_orm::DatabaseConnection;
use uuid::Uuid;

use heroes_backend::config::LifecyclePolicy;
use heroes_backend::errors::AppError;
use heroes_backend::models::offers::{self, CreateOffer, OfferDecision, OfferStatus, UpdateOfferPrice};
use heroes_backend::models::tasks::{self, CreateTask};
use heroes_backend::models::users::Roles;
use heroes_backend::services::{offers as offer_service, tasks as task_service};

use common::*;

async fn open_task(db: &DatabaseConnection, owner: Uuid) -> tasks::Model {
    task_service::create_task(
        db,
        owner,
        CreateTask {
            category_id: Some(Uuid::new_v4()),
            subcategory_id: None,
            location: Some("Harbour district".to_string()),
            description: Some("Assemble a wardrobe".to_string()),
            budget: Some(120.0),
            images: None,
        },
    )
    .await
    .unwrap()
}

async fn bid(db: &DatabaseConnection, bidder: Uuid, task_id: Uuid, price: f64) -> Result<offers::Model, AppError> {
    offer_service::create_offer(
        db,
        bidder,
        CreateOffer {
            task_id: Some(task_id),
            price: Some(price),
        },
    )
    .await
}

fn on(task_id: Uuid) -> OfferDecision {
    OfferDecision {
        task_id: Some(task_id),
    }
}

#[tokio::test]
async fn one_offer_per_bidder_per_task() {
    let db = setup_db().await;
    let owner = create_user(&db, Roles::Customer).await;
    let hero = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;

    let offer = bid(&db, hero.id, task.id, 100.0).await.unwrap();
    assert_eq!(offer.status, OfferStatus::Pending);
    assert_eq!(offer.price, 100.0);

    let err = bid(&db, hero.id, task.id, 90.0).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn create_offer_rejects_bad_targets() {
    let db = setup_db().await;
    let owner = create_user(&db, Roles::Customer).await;
    let hero = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;

    let err = bid(&db, owner.id, task.id, 50.0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = bid(&db, hero.id, Uuid::new_v4(), 50.0).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = bid(&db, hero.id, task.id, 0.0).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    task_service::cancel_task(&db, owner.id, task.id).await.unwrap();
    let err = bid(&db, hero.id, task.id, 50.0).await.unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}

#[tokio::test]
async fn only_the_bidder_reprices_and_only_while_pending() {
    let db = setup_db().await;
    let owner = create_user(&db, Roles::Customer).await;
    let hero = create_user(&db, Roles::Hero).await;
    let rival = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;
    let offer = bid(&db, hero.id, task.id, 100.0).await.unwrap();

    let err = offer_service::update_price(&db, rival.id, offer.id, UpdateOfferPrice { price: Some(80.0) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let repriced = offer_service::update_price(&db, hero.id, offer.id, UpdateOfferPrice { price: Some(85.0) })
        .await
        .unwrap();
    assert_eq!(repriced.price, 85.0);

    let policy = LifecyclePolicy::default();
    let declined = offer_service::decline_offer(&db, &policy, hero.id, offer.id, on(task.id))
        .await
        .unwrap();
    assert_eq!(declined.status, OfferStatus::Declined);

    let err = offer_service::update_price(&db, hero.id, offer.id, UpdateOfferPrice { price: Some(70.0) })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}

#[tokio::test]
async fn accept_requires_matching_task_and_bidder() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let owner = create_user(&db, Roles::Customer).await;
    let hero = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;
    let other_task = open_task(&db, owner.id).await;
    let offer = bid(&db, hero.id, task.id, 100.0).await.unwrap();

    let err = offer_service::accept_offer(&db, &policy, hero.id, offer.id, on(other_task.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = offer_service::accept_offer(&db, &policy, owner.id, offer.id, on(task.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let accepted = offer_service::accept_offer(&db, &policy, hero.id, offer.id, on(task.id))
        .await
        .unwrap();
    assert_eq!(accepted.status, OfferStatus::Accepted);

    let err = offer_service::accept_offer(&db, &policy, hero.id, offer.id, on(task.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));

    let err = offer_service::decline_offer(&db, &policy, hero.id, offer.id, on(task.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::State(_)));
}

#[tokio::test]
async fn sibling_offers_may_both_be_accepted_by_default() {
    let db = setup_db().await;
    let policy = LifecyclePolicy::default();
    let owner = create_user(&db, Roles::Customer).await;
    let first = create_user(&db, Roles::Hero).await;
    let second = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;
    let a = bid(&db, first.id, task.id, 100.0).await.unwrap();
    let b = bid(&db, second.id, task.id, 95.0).await.unwrap();

    offer_service::accept_offer(&db, &policy, first.id, a.id, on(task.id))
        .await
        .unwrap();
    let b = offer_service::accept_offer(&db, &policy, second.id, b.id, on(task.id))
        .await
        .unwrap();

    assert_eq!(b.status, OfferStatus::Accepted);
}

#[tokio::test]
async fn sibling_accept_conflicts_when_disallowed() {
    let db = setup_db().await;
    let policy = LifecyclePolicy {
        allow_sibling_accepts: false,
        ..LifecyclePolicy::default()
    };
    let owner = create_user(&db, Roles::Customer).await;
    let first = create_user(&db, Roles::Hero).await;
    let second = create_user(&db, Roles::Hero).await;
    let task = open_task(&db, owner.id).await;
    let a = bid(&db, first.id, task.id, 100.0).await.unwrap();
    let b = bid(&db, second.id, task.id, 95.0).await.unwrap();

    offer_service::accept_offer(&db, &policy, first.id, a.id, on(task.id))
        .await
        .unwrap();
    let err = offer_service::accept_offer(&db, &policy, second.id, b.id, on(task.id))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Declining is still allowed.
    let b = offer_service::decline_offer(&db, &policy, second.id, b.id, on(task.id))
        .await
        .unwrap();
    assert_eq!(b.status, OfferStatus::Declined);
}
