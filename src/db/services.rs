use sea_orm::*;
use uuid::Uuid;

use crate::models::services;

/// Fetch a single service by ID.
pub async fn get_service_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<services::Model>, DbErr> {
    services::Entity::find_by_id(id).one(db).await
}

/// Fetch every service in `ids` (missing ids are simply absent from the result).
pub async fn get_services_by_ids<C: ConnectionTrait>(
    db: &C,
    ids: Vec<Uuid>,
) -> Result<Vec<services::Model>, DbErr> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    services::Entity::find()
        .filter(services::Column::Id.is_in(ids))
        .all(db)
        .await
}
