//! Cart domain models.
//!
//! A cart is scoped to an anonymous browser session. Once paid it is
//! terminal: every mutating operation rejects with a conflict.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::payment::PaymentType;

/// Cart with its line items, as returned to the client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CartView {
    pub id: Uuid,
    pub session_id: String,
    pub total_amount: Decimal,
    pub currency: String,
    pub payment_type: Option<PaymentType>,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub invitee_name: Option<String>,
    pub invitee_email: Option<String>,
    pub invitee_phone: Option<String>,
    pub message: Option<String>,
    pub items: Vec<CartItemView>,
}

/// One cart line: a gift, its quantity, and the effective unit price.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CartItemView {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub gift_name: String,
    pub quantity: i32,
    /// Snapshot price if taken at add time, otherwise the live gift price.
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Request to add a gift to a cart.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct AddCartItemRequest {
    pub gift_id: Uuid,

    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: i32,
}

/// Request to change a line's quantity.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCartItemRequest {
    #[validate(custom(function = "shared::validation::validate_quantity"))]
    pub quantity: i32,
}

/// Guest contact details persisted on the cart before checkout.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateCartDetailsRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub invitee_name: String,

    #[validate(email(message = "Invalid email address"))]
    pub invitee_email: String,

    #[validate(custom(function = "shared::validation::validate_phone"))]
    pub invitee_phone: Option<String>,

    #[validate(length(max = 1000, message = "Message too long"))]
    pub message: Option<String>,
}

/// Computes one line's effective unit price: the snapshot taken at add time
/// wins, otherwise the gift's live price.
pub fn effective_unit_price(snapshot: Option<Decimal>, live_price: Decimal) -> Decimal {
    snapshot.unwrap_or(live_price)
}

/// Sums line totals over `(snapshot_price, live_price, quantity)` triples.
pub fn cart_total(lines: &[(Option<Decimal>, Decimal, i32)]) -> Decimal {
    lines
        .iter()
        .map(|(snapshot, live, qty)| effective_unit_price(*snapshot, *live) * Decimal::from(*qty))
        .sum()
}
