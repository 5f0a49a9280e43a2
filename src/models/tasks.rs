use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::OneOrMany;

/// Task status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl TaskStatus {
    /// Transitions a hero or driver may apply to someone else's task.
    pub fn can_advance_to(self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Open, TaskStatus::Accepted)
                | (TaskStatus::Open, TaskStatus::Rejected)
                | (TaskStatus::Accepted, TaskStatus::Completed)
        )
    }

    /// The owner may cancel anything that has not finished.
    pub fn is_cancellable(self) -> bool {
        matches!(
            self,
            TaskStatus::Open | TaskStatus::Accepted | TaskStatus::Rejected
        )
    }
}

/// Image paths attached to a task, stored as a JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct ImageList(pub Vec<String>);

/// SeaORM entity for the `tasks` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category_id: Uuid,
    pub subcategory_id: Option<Uuid>,
    pub location: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Double")]
    pub budget: f64,
    #[sea_orm(column_type = "JsonBinary")]
    pub images: ImageList,
    pub status: TaskStatus,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::offers::Entity")]
    Offers,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::offers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Offers.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTask {
    pub category_id: Option<Uuid>,
    pub subcategory_id: Option<Uuid>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub budget: Option<f64>,
    /// A single path or a list of paths; always stored as a list.
    pub images: Option<OneOrMany<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskCheckoutRequest {
    pub offer_id: Option<Uuid>,
    #[serde(alias = "payment_method_id")]
    pub payment_method: Option<Uuid>,
    #[serde(alias = "pin_code")]
    pub pin: Option<String>,
    #[serde(flatten)]
    pub checkout: super::checkout::CheckoutFields,
    #[serde(alias = "voucherCode")]
    pub voucher_code: Option<String>,
    pub location: Option<String>,
}
