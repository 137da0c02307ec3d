//! Payment gateway abstraction.
//!
//! Stripe and PayPal adapters live in the API crate; this trait is the seam
//! the checkout flow (and tests) program against.

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Errors a gateway can produce.
///
/// `Incomplete` is the one non-exceptional variant: the provider answered but
/// the payment is not in a captured/paid state. Callers map it to a client
/// error carrying the provider's status verbatim.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Payment not completed, provider status: {status}")]
    Incomplete { status: String },

    #[error("Provider authentication failed: {0}")]
    Auth(String),

    #[error("Provider API error: {0}")]
    Api(String),

    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider response missing field: {0}")]
    MalformedResponse(&'static str),
}

/// One line item sent to the provider's hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLineItem {
    pub name: String,
    /// Unit amount in minor currency units (cents).
    pub unit_amount_minor: i64,
    pub quantity: i64,
}

/// Everything a gateway needs to create a hosted session/order.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub cart_id: Uuid,
    /// Cart total in minor currency units.
    pub total_minor: i64,
    pub currency: String,
    pub line_items: Vec<CheckoutLineItem>,
    pub return_url: String,
    pub cancel_url: String,
}

/// Created provider session: the id to persist and the URL to redirect to.
#[derive(Debug, Clone)]
pub struct ProviderSession {
    pub payment_id: String,
    pub approval_url: String,
}

/// Result of a successful capture/retrieval.
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub amount: Decimal,
    pub currency: String,
    pub fee: Option<Decimal>,
    pub payer_name: Option<String>,
    pub payer_email: Option<String>,
    /// Raw provider payload, stored on the ledger row for audit.
    pub raw_response: serde_json::Value,
}

/// A hosted-checkout payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a hosted checkout session/order for the cart.
    async fn create_session(&self, request: &SessionRequest)
        -> Result<ProviderSession, GatewayError>;

    /// Capture (PayPal) or verify (Stripe) the payment identified by
    /// `payment_id`. Must return `GatewayError::Incomplete` when the provider
    /// reports anything other than a completed payment.
    async fn capture(
        &self,
        payment_id: &str,
        payer_id: Option<&str>,
    ) -> Result<CaptureOutcome, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_error_carries_provider_status() {
        let err = GatewayError::Incomplete {
            status: "PENDING".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Payment not completed, provider status: PENDING"
        );
    }

    #[test]
    fn test_line_item_equality() {
        let a = CheckoutLineItem {
            name: "Stand mixer".to_string(),
            unit_amount_minor: 49999,
            quantity: 2,
        };
        assert_eq!(a, a.clone());
    }
}
