//! Application state and router assembly.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware::from_fn;
use axum::routing::get;
use axum::Router;
use domain::models::PaymentType;
use domain::services::PaymentGateway;
use sqlx::PgPool;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes;
use crate::services::{EmailService, PayPalGateway, StripeGateway};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub stripe: Arc<dyn PaymentGateway>,
    pub paypal: Arc<dyn PaymentGateway>,
    pub email: Arc<EmailService>,
}

impl AppState {
    /// Gateway adapter for the given provider.
    pub fn gateway(&self, payment_type: PaymentType) -> &Arc<dyn PaymentGateway> {
        match payment_type {
            PaymentType::Stripe => &self.stripe,
            PaymentType::Paypal => &self.paypal,
        }
    }
}

/// Create the application with real provider gateways.
pub fn create_app(config: Config, pool: PgPool) -> Router {
    let stripe: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(config.stripe.clone()));
    let paypal: Arc<dyn PaymentGateway> = Arc::new(PayPalGateway::new(config.paypal.clone()));
    create_app_with_gateways(config, pool, stripe, paypal)
}

/// Create the application with injected gateways. Tests pass stubs here so
/// checkout flows run without touching Stripe or PayPal.
pub fn create_app_with_gateways(
    config: Config,
    pool: PgPool,
    stripe: Arc<dyn PaymentGateway>,
    paypal: Arc<dyn PaymentGateway>,
) -> Router {
    let email = Arc::new(EmailService::new(config.email.clone()));
    let request_timeout = std::time::Duration::from_secs(config.server.request_timeout_secs);
    let cors = build_cors_layer(&config.security.cors_origins);

    let state = AppState {
        pool,
        config: Arc::new(config),
        stripe,
        paypal,
        email,
    };

    Router::new()
        .nest("/api/health", routes::health::router())
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", routes::api_router())
        .layer(from_fn(trace_id))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(metrics_middleware))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

/// CORS from the configured origin list; an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
