//! HTTP route handlers.

pub mod carts;
pub mod emails;
pub mod gifts;
pub mod health;
pub mod invitees;
pub mod payments;
pub mod wedding_lists;

use axum::Router;

use crate::app::AppState;

/// All versioned API routes, mounted under `/api/v1`.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(carts::router())
        .merge(payments::router())
        .merge(gifts::router())
        .merge(wedding_lists::router())
        .merge(invitees::router())
        .merge(emails::router())
}
