use sea_orm::*;
use uuid::Uuid;

use crate::models::users::{self, CreateUserFromAuth};

/// Find the user named by an access token, creating a bare record on first sight.
pub async fn find_or_create_from_auth<C: ConnectionTrait>(
    db: &C,
    input: CreateUserFromAuth,
) -> Result<users::Model, DbErr> {
    if let Some(existing) = users::Entity::find_by_id(input.id).one(db).await? {
        return Ok(existing);
    }

    // Profile verification fields start empty; the account service fills them in.
    let new_user = users::ActiveModel {
        id: Set(input.id),
        email: Set(input.email),
        display_name: Set(None),
        role: Set(input.role),
        pin: Set(None),
        is_pin_verified: Set(false),
        biometric_enabled: Set(false),
        identity_document: Set(None),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_user.insert(db).await
}
