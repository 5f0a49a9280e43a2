//! Checkout payload shaping.
//!
//! On the wire a checkout arrives as a `checkout_type` string plus one of
//! three optional info blocks, each of which may be a single object or an
//! array. Everything past the handler works with [`CheckoutDetails`], where
//! the type and its info block cannot disagree.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::OneOrMany;
use crate::errors::AppError;

/// Fulfilment mode of an order, stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum CheckoutType {
    #[sea_orm(string_value = "delivery")]
    Delivery,
    #[sea_orm(string_value = "pickup")]
    Pickup,
    #[sea_orm(string_value = "mail")]
    Mail,
}

impl CheckoutType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "delivery" => Some(Self::Delivery),
            "pickup" => Some(Self::Pickup),
            "mail" => Some(Self::Mail),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfilmentOption {
    Standard,
    Priority,
    Schedule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    #[serde(alias = "deliveryAddress")]
    pub delivery_address: Option<String>,
    #[serde(alias = "deliveryOptions")]
    pub delivery_options: Option<FulfilmentOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupInfo {
    #[serde(alias = "pickupAddress")]
    pub pickup_address: Option<String>,
    #[serde(alias = "pickupOptions")]
    pub pickup_options: Option<FulfilmentOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailInfo {
    #[serde(alias = "yourAddress")]
    pub your_address: Option<String>,
    #[serde(alias = "heroAddress")]
    pub hero_address: Option<String>,
    #[serde(alias = "mailOptions")]
    pub mail_options: Option<FulfilmentOption>,
}

/// The checkout type together with its own info block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(tag = "type", content = "info", rename_all = "snake_case")]
pub enum CheckoutDetails {
    Delivery(Vec<DeliveryInfo>),
    Pickup(Vec<PickupInfo>),
    Mail(Vec<MailInfo>),
}

impl CheckoutDetails {
    pub fn checkout_type(&self) -> CheckoutType {
        match self {
            Self::Delivery(_) => CheckoutType::Delivery,
            Self::Pickup(_) => CheckoutType::Pickup,
            Self::Mail(_) => CheckoutType::Mail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverInstruction {
    #[serde(alias = "collectionInstruction")]
    pub collection_instruction: Option<String>,
    #[serde(alias = "deliveryInstruction")]
    pub delivery_instruction: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct DriverInstructions(pub Vec<DriverInstruction>);

/// Checkout fields as they arrive in a request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutFields {
    #[serde(alias = "checkoutType")]
    pub checkout_type: Option<String>,
    #[serde(alias = "deliveryInfo")]
    pub delivery_info: Option<OneOrMany<DeliveryInfo>>,
    #[serde(alias = "pickupInfo")]
    pub pickup_info: Option<OneOrMany<PickupInfo>>,
    #[serde(alias = "mailInfo")]
    pub mail_info: Option<OneOrMany<MailInfo>>,
    #[serde(alias = "driverInstruction")]
    pub driver_instruction: Option<OneOrMany<DriverInstruction>>,
}

impl CheckoutFields {
    /// Select the info block matching `checkout_type`. The block for the
    /// chosen type must be present and non-empty; blocks for other types are
    /// dropped.
    pub fn into_details(self) -> Result<CheckoutDetails, AppError> {
        let raw = self
            .checkout_type
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::validation("checkout_type is required."))?;
        let kind =
            CheckoutType::parse(raw).ok_or_else(|| AppError::validation("Invalid checkout type."))?;

        match kind {
            CheckoutType::Delivery => {
                required_block(self.delivery_info, "delivery_info").map(CheckoutDetails::Delivery)
            }
            CheckoutType::Pickup => {
                required_block(self.pickup_info, "pickup_info").map(CheckoutDetails::Pickup)
            }
            CheckoutType::Mail => {
                required_block(self.mail_info, "mail_info").map(CheckoutDetails::Mail)
            }
        }
    }

    pub fn driver_instructions(&self) -> Option<DriverInstructions> {
        self.driver_instruction
            .clone()
            .map(|d| DriverInstructions(d.into_vec()))
            .filter(|d| !d.0.is_empty())
    }
}

fn required_block<T>(block: Option<OneOrMany<T>>, name: &str) -> Result<Vec<T>, AppError> {
    match block.map(OneOrMany::into_vec) {
        Some(items) if !items.is_empty() => Ok(items),
        _ => Err(AppError::validation(format!(
            "{name} is required for this checkout type."
        ))),
    }
}

/// Optional schedule attached to a checkout. Only kept when both parts are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleInfo {
    #[serde(alias = "ScheduleDate", alias = "date")]
    pub schedule_date: Option<DateTimeUtc>,
    #[serde(alias = "ScheduleTimeSlot", alias = "time_slot")]
    pub schedule_time_slot: Option<String>,
}

impl ScheduleInfo {
    pub fn complete(&self) -> Option<(DateTimeUtc, String)> {
        match (&self.schedule_date, &self.schedule_time_slot) {
            (Some(date), Some(slot)) if !slot.trim().is_empty() => Some((*date, slot.clone())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> CheckoutFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn delivery_block_as_single_object_is_normalized() {
        let details = fields(json!({
            "checkoutType": "delivery",
            "deliveryInfo": { "deliveryAddress": "12 Harbour Rd", "deliveryOptions": "priority" }
        }))
        .into_details()
        .unwrap();

        match details {
            CheckoutDetails::Delivery(info) => {
                assert_eq!(info.len(), 1);
                assert_eq!(info[0].delivery_address.as_deref(), Some("12 Harbour Rd"));
                assert_eq!(info[0].delivery_options, Some(FulfilmentOption::Priority));
            }
            other => panic!("unexpected details: {other:?}"),
        }
    }

    #[test]
    fn other_type_blocks_are_dropped() {
        let details = fields(json!({
            "checkout_type": "mail",
            "mail_info": [{ "your_address": "a", "hero_address": "b" }],
            "pickup_info": [{ "pickup_address": "ignored" }]
        }))
        .into_details()
        .unwrap();

        assert_eq!(details.checkout_type(), CheckoutType::Mail);
    }

    #[test]
    fn missing_block_for_type_is_rejected() {
        let err = fields(json!({
            "checkout_type": "pickup",
            "delivery_info": [{ "delivery_address": "x" }]
        }))
        .into_details()
        .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = fields(json!({ "checkout_type": "teleport" }))
            .into_details()
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid checkout type."));
    }

    #[test]
    fn details_round_trip_through_storage_shape() {
        let details = CheckoutDetails::Pickup(vec![PickupInfo {
            pickup_address: Some("Depot 4".to_string()),
            pickup_options: None,
        }]);
        let stored = serde_json::to_value(&details).unwrap();
        assert_eq!(stored["type"], "pickup");
        assert_eq!(serde_json::from_value::<CheckoutDetails>(stored).unwrap(), details);
    }

    #[test]
    fn schedule_needs_both_parts() {
        let partial = ScheduleInfo {
            schedule_date: Some(chrono::Utc::now()),
            schedule_time_slot: None,
        };
        assert!(partial.complete().is_none());

        let full: ScheduleInfo = serde_json::from_value(json!({
            "ScheduleDate": "2026-11-02T09:00:00Z",
            "ScheduleTimeSlot": "09:00-11:00"
        }))
        .unwrap();
        assert_eq!(full.complete().map(|(_, slot)| slot), Some("09:00-11:00".to_string()));
    }
}
