use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// The `Roles` enum maps to a Postgres TEXT column stored as lowercase strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum Roles {
    #[sea_orm(string_value = "customer")]
    Customer,
    /// Service provider.
    #[sea_orm(string_value = "hero")]
    Hero,
    #[sea_orm(string_value = "driver")]
    Driver,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Roles {
    /// Parse the role claim carried by an access token. Unknown values fall back to `Customer`.
    pub fn from_claim(role: Option<&str>) -> Self {
        match role.map(str::to_ascii_lowercase).as_deref() {
            Some("hero") => Self::Hero,
            Some("driver") => Self::Driver,
            Some("admin") => Self::Admin,
            _ => Self::Customer,
        }
    }
}

/// SeaORM entity for the `users` table.
///
/// Registration, PIN setup, biometrics and identity documents are written by
/// the account service; this crate only reads them at checkout.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Roles,
    #[serde(skip_serializing)]
    pub pin: Option<String>,
    pub is_pin_verified: bool,
    pub biometric_enabled: bool,
    #[serde(skip_serializing)]
    pub identity_document: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

impl Model {
    /// A profile is verified once a PIN is set and confirmed, biometrics are
    /// enabled and an identity document is on file.
    pub fn is_profile_verified(&self) -> bool {
        let has_pin = self.pin.as_deref().is_some_and(|p| !p.is_empty());
        let has_document = self
            .identity_document
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty());

        has_pin && self.is_pin_verified && self.biometric_enabled && has_document
    }

    pub fn pin_matches(&self, submitted: &str) -> bool {
        self.pin.as_deref() == Some(submitted)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::tasks::Entity")]
    Tasks,
    #[sea_orm(has_many = "super::orders::Entity")]
    Orders,
}

impl Related<super::tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// ── DTOs (not stored in DB) ──

/// Used internally by the auth extractor to create a user from JWT claims.
#[derive(Debug, Clone)]
pub struct CreateUserFromAuth {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Roles,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Model {
        Model {
            id: Uuid::new_v4(),
            email: None,
            display_name: None,
            role: Roles::Customer,
            pin: Some("1234".to_string()),
            is_pin_verified: true,
            biometric_enabled: true,
            identity_document: Some("ID-99812".to_string()),
            created_at: chrono::Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn complete_profile_is_verified() {
        assert!(user().is_profile_verified());
    }

    #[test]
    fn each_missing_piece_blocks_verification() {
        let mut u = user();
        u.biometric_enabled = false;
        assert!(!u.is_profile_verified());

        let mut u = user();
        u.identity_document = Some("  ".to_string());
        assert!(!u.is_profile_verified());

        let mut u = user();
        u.is_pin_verified = false;
        assert!(!u.is_profile_verified());

        let mut u = user();
        u.pin = None;
        assert!(!u.is_profile_verified());
    }

    #[test]
    fn role_claim_parsing() {
        assert_eq!(Roles::from_claim(Some("HERO")), Roles::Hero);
        assert_eq!(Roles::from_claim(Some("driver")), Roles::Driver);
        assert_eq!(Roles::from_claim(None), Roles::Customer);
        assert_eq!(Roles::from_claim(Some("superuser")), Roles::Customer);
    }
}
