//! Payment domain models: provider selection, initiation/verification
//! requests and the MoneyBag ledger view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::cart::CartItemView;

/// Payment provider selected for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentType {
    Stripe,
    Paypal,
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentType::Stripe => write!(f, "STRIPE"),
            PaymentType::Paypal => write!(f, "PAYPAL"),
        }
    }
}

impl std::str::FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "STRIPE" => Ok(PaymentType::Stripe),
            "PAYPAL" => Ok(PaymentType::Paypal),
            other => Err(format!("Unsupported payment type: {}", other)),
        }
    }
}

/// Request to initiate a payment for a cart.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct InitiatePaymentRequest {
    pub cart_id: Uuid,

    /// "STRIPE" or "PAYPAL". Kept as a string and parsed by the handler so an
    /// unsupported provider is a 400, not a body-rejection 422.
    pub payment_type: String,

    #[validate(url(message = "Invalid return URL"))]
    pub return_url: String,

    #[validate(url(message = "Invalid cancel URL"))]
    pub cancel_url: String,
}

/// Response after creating a provider session/order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct InitiatePaymentResponse {
    pub success: bool,
    /// Provider's session or order id, persisted on the cart.
    pub payment_id: String,
    /// Hosted payment page the browser should navigate to.
    pub approval_url: String,
}

/// Request to verify/capture a payment after the provider redirect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifyPaymentRequest {
    pub payment_id: String,
    pub payment_type: PaymentType,
    /// PayPal approval returns a PayerID alongside the order token.
    #[serde(alias = "PayerID")]
    pub payer_id: Option<String>,
}

/// Response after a successful (or idempotently repeated) capture.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub money_bag_id: Uuid,
    pub cart_id: Uuid,
    /// True when the cart was already paid and no provider call was made.
    pub already_captured: bool,
}

/// Request to reset transient payment linkage on an unpaid cart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CancelPaymentRequest {
    pub cart_id: Uuid,
}

/// Immutable ledger record of a captured payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct MoneyBag {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub provider: PaymentType,
    pub payment_id: String,
    pub amount: Decimal,
    pub currency: String,
    pub fee: Option<Decimal>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payment summary: the ledger record plus the cart's line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PaymentSummary {
    pub money_bag: MoneyBag,
    pub invitee_name: Option<String>,
    pub message: Option<String>,
    pub items: Vec<CartItemView>,
}

/// Admin listing of captured payments.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ListPaymentsResponse {
    pub data: Vec<MoneyBag>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_payment_type_roundtrip() {
        assert_eq!(PaymentType::from_str("STRIPE").unwrap(), PaymentType::Stripe);
        assert_eq!(PaymentType::from_str("PAYPAL").unwrap(), PaymentType::Paypal);
        assert_eq!(PaymentType::Paypal.to_string(), "PAYPAL");
        assert!(PaymentType::from_str("BITCOIN").is_err());
    }

    #[test]
    fn test_payment_type_serde_uses_screaming_case() {
        let json = serde_json::to_string(&PaymentType::Stripe).unwrap();
        assert_eq!(json, "\"STRIPE\"");
        let back: PaymentType = serde_json::from_str("\"PAYPAL\"").unwrap();
        assert_eq!(back, PaymentType::Paypal);
    }

    #[test]
    fn test_verify_request_accepts_payer_id_alias() {
        let json = r#"{"payment_id":"5O190127TN364715T","payment_type":"PAYPAL","PayerID":"7E7MGXCWTTKK2"}"#;
        let req: VerifyPaymentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.payer_id.as_deref(), Some("7E7MGXCWTTKK2"));
    }

    #[test]
    fn test_initiate_request_validates_urls() {
        let req = InitiatePaymentRequest {
            cart_id: Uuid::new_v4(),
            payment_type: "STRIPE".to_string(),
            return_url: "not a url".to_string(),
            cancel_url: "https://example.com/cancel".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
