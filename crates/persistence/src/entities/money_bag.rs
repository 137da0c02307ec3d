//! MoneyBag entity (database row mapping).
//!
//! MoneyBag rows are the payment ledger: inserted once per capture, never
//! updated.

use chrono::{DateTime, Utc};
use domain::models::PaymentType;
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for payment_provider that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_provider", rename_all = "lowercase")]
pub enum PaymentProviderDb {
    Stripe,
    Paypal,
}

impl From<PaymentProviderDb> for PaymentType {
    fn from(db: PaymentProviderDb) -> Self {
        match db {
            PaymentProviderDb::Stripe => PaymentType::Stripe,
            PaymentProviderDb::Paypal => PaymentType::Paypal,
        }
    }
}

impl From<PaymentType> for PaymentProviderDb {
    fn from(ty: PaymentType) -> Self {
        match ty {
            PaymentType::Stripe => PaymentProviderDb::Stripe,
            PaymentType::Paypal => PaymentProviderDb::Paypal,
        }
    }
}

/// Database row mapping for the money_bags table.
#[derive(Debug, Clone, FromRow)]
pub struct MoneyBagEntity {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub provider: PaymentProviderDb,
    pub payment_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub fee: Option<Decimal>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    pub raw_response: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
