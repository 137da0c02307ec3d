//! Gift domain models.
//!
//! Availability is quantity-aware: a gift carries `quantity` and
//! `purchased_quantity`, and `is_purchased` is derived from the two. There is
//! no separately stored "purchased" flag that could drift from the purchase
//! ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Status of a purchase ledger row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Pending,
    Confirmed,
}

impl std::fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PurchaseStatus::Pending => write!(f, "PENDING"),
            PurchaseStatus::Confirmed => write!(f, "CONFIRMED"),
        }
    }
}

impl std::str::FromStr for PurchaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PurchaseStatus::Pending),
            "CONFIRMED" => Ok(PurchaseStatus::Confirmed),
            other => Err(format!("Unknown purchase status: {}", other)),
        }
    }
}

/// Gift representation for registry pages and couple dashboards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct GiftSummary {
    pub id: Uuid,
    pub wedding_list_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub purchased_quantity: i32,
    /// Derived: true once every unit has been purchased.
    pub is_purchased: bool,
    pub created_at: DateTime<Utc>,
}

impl GiftSummary {
    pub fn derive_is_purchased(quantity: i32, purchased_quantity: i32) -> bool {
        purchased_quantity >= quantity
    }
}

/// Request to create a gift on a wedding list.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct CreateGiftRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_price"))]
    pub price: Decimal,

    #[validate(custom(function = "shared::validation::validate_currency"))]
    pub currency: Option<String>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    #[validate(length(max = 80, message = "Category too long"))]
    pub category: Option<String>,

    /// Units the couple wishes to receive (default: 1).
    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: Option<i32>,
}

/// Request to update a gift. All fields optional.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateGiftRequest {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 2000, message = "Description too long"))]
    pub description: Option<String>,

    #[validate(custom(function = "shared::validation::validate_price"))]
    pub price: Option<Decimal>,

    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,

    #[validate(length(max = 80, message = "Category too long"))]
    pub category: Option<String>,

    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: Option<i32>,
}

/// Request to purchase a gift directly (non-cart path).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct PurchaseGiftRequest {
    #[validate(length(max = 1000, message = "Message too long"))]
    pub message: Option<String>,
}

/// Response after a direct gift purchase.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PurchaseGiftResponse {
    pub purchase_id: Uuid,
    pub gift_id: Uuid,
    pub status: PurchaseStatus,
    pub purchased_quantity: i32,
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_purchase_status_roundtrip() {
        use std::str::FromStr;
        assert_eq!(
            PurchaseStatus::from_str("PENDING").unwrap(),
            PurchaseStatus::Pending
        );
        assert_eq!(PurchaseStatus::Confirmed.to_string(), "CONFIRMED");
        assert!(PurchaseStatus::from_str("REFUNDED").is_err());
    }

    #[test]
    fn test_derive_is_purchased() {
        assert!(!GiftSummary::derive_is_purchased(2, 1));
        assert!(GiftSummary::derive_is_purchased(2, 2));
        assert!(GiftSummary::derive_is_purchased(1, 1));
        assert!(!GiftSummary::derive_is_purchased(1, 0));
    }

    #[test]
    fn test_create_gift_request_validation() {
        let valid = CreateGiftRequest {
            name: "Stand mixer".to_string(),
            description: None,
            price: dec!(499.99),
            currency: Some("USD".to_string()),
            image_url: None,
            category: Some("kitchen".to_string()),
            quantity: Some(2),
        };
        assert!(valid.validate().is_ok());

        let zero_price = CreateGiftRequest {
            price: dec!(0),
            ..valid.clone()
        };
        assert!(zero_price.validate().is_err());

        let bad_quantity = CreateGiftRequest {
            quantity: Some(0),
            ..valid.clone()
        };
        assert!(bad_quantity.validate().is_err());

        let bad_currency = CreateGiftRequest {
            currency: Some("DOLLARS".to_string()),
            ..valid
        };
        assert!(bad_currency.validate().is_err());
    }
}
