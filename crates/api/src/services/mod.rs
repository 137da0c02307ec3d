//! External service adapters: payment gateways and email delivery.

pub mod email;
pub mod paypal;
pub mod stripe;

pub use email::EmailService;
pub use paypal::PayPalGateway;
pub use stripe::StripeGateway;
