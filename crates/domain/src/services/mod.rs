//! Domain service traits.

pub mod payment;

pub use payment::{
    CaptureOutcome, CheckoutLineItem, GatewayError, PaymentGateway, ProviderSession,
    SessionRequest,
};
