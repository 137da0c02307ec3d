//! Explicit checkout state.
//!
//! The original flow reconstructed "where is this guest in the checkout"
//! from scattered URL parameters in the browser. Here the state is a single
//! enum derived on the server from the cart plus the provider-return query
//! parameters; `Cart.is_paid` stays the source of truth.

use serde::{Deserialize, Serialize};

/// Where a cart stands in the checkout flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutState {
    /// Cart is empty; nothing to check out.
    Idle,
    /// Cart has items; guest is filling in contact details.
    Details,
    /// A provider session exists; guest is on (or heading to) the hosted
    /// payment page.
    AwaitingProvider,
    /// Provider redirected back with approval parameters; capture pending.
    Capturing,
    /// Payment captured; the cart is terminal.
    Confirmed,
    /// Guest returned via the cancel URL; payment linkage should be reset.
    Cancelled,
}

/// Query parameters the provider redirect may carry back.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderReturnParams {
    /// PayPal order token from the approval return.
    pub token: Option<String>,
    /// PayPal payer id from the approval return.
    #[serde(rename = "PayerID")]
    pub payer_id: Option<String>,
    /// Set by the cancel URL.
    #[serde(default)]
    pub cancelled: bool,
}

/// Cart facts needed to derive the checkout state.
#[derive(Debug, Clone, Copy)]
pub struct CartCheckoutFacts {
    pub has_items: bool,
    pub has_payment_id: bool,
    pub is_paid: bool,
}

/// Derives the checkout state from cart facts and return parameters.
///
/// Precedence: a paid cart is Confirmed no matter what the URL says; an
/// explicit cancel beats a stale approval return.
pub fn derive_checkout_state(
    facts: CartCheckoutFacts,
    params: &ProviderReturnParams,
) -> CheckoutState {
    if facts.is_paid {
        return CheckoutState::Confirmed;
    }
    if params.cancelled {
        return CheckoutState::Cancelled;
    }
    if facts.has_payment_id && (params.token.is_some() || params.payer_id.is_some()) {
        return CheckoutState::Capturing;
    }
    if facts.has_payment_id {
        return CheckoutState::AwaitingProvider;
    }
    if facts.has_items {
        return CheckoutState::Details;
    }
    CheckoutState::Idle
}

/// Response for the checkout-state endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckoutStateResponse {
    pub state: CheckoutState,
}
