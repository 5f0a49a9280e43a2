use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Offer status stored as a lowercase string in the database.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum OfferStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "declined")]
    Declined,
}

/// SeaORM entity for the `offers` table. `(task_id, user_id)` is unique.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "offers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub task_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(column_type = "Double")]
    pub price: f64,
    pub status: OfferStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tasks::Entity",
        from = "Column::TaskId",
        to = "super::tasks::Column::Id"
    )]
    Task,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

/// Request body for POST /api/offers. The bidder comes from the JWT.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOffer {
    pub task_id: Option<Uuid>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateOfferPrice {
    pub price: Option<f64>,
}

/// Request body for accept/decline; the task id must match the offer's task.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferDecision {
    pub task_id: Option<Uuid>,
}
