//! Cart and cart item entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::PaymentType;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

use super::money_bag::PaymentProviderDb;

/// Database row mapping for the carts table.
#[derive(Debug, Clone, FromRow)]
pub struct CartEntity {
    pub id: Uuid,
    pub session_id: String,
    pub total_amount: Option<Decimal>,
    pub currency: String,
    pub payment_type: Option<PaymentProviderDb>,
    pub payment_id: Option<String>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub invitee_name: Option<String>,
    pub invitee_email: Option<String>,
    pub invitee_phone: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartEntity {
    pub fn payment_type(&self) -> Option<PaymentType> {
        self.payment_type.map(Into::into)
    }
}

/// Database row mapping for the cart_items table.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemEntity {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub gift_id: Uuid,
    pub quantity: i32,
    /// Price snapshot taken at add time; NULL falls back to the gift price.
    pub price: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Cart item joined with its gift, for totals and provider line items.
#[derive(Debug, Clone, FromRow)]
pub struct CartItemWithGiftEntity {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub gift_id: Uuid,
    pub quantity: i32,
    pub price: Option<Decimal>,
    // Gift info
    pub gift_name: String,
    pub gift_price: Decimal,
    pub gift_currency: String,
}

impl CartItemWithGiftEntity {
    /// Snapshot price wins; otherwise the live gift price.
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or(self.gift_price)
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }
}
