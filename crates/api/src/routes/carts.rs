//! Cart endpoints.
//!
//! Carts are keyed by an anonymous browser session id and need no
//! authentication. A paid cart is terminal: every mutation returns a conflict.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use domain::models::cart::{AddCartItemRequest, UpdateCartDetailsRequest, UpdateCartItemRequest};
use domain::models::checkout::{
    derive_checkout_state, CartCheckoutFacts, CheckoutStateResponse, ProviderReturnParams,
};
use domain::models::{CartItemView, CartView};
use persistence::entities::CartEntity;
use persistence::repositories::CartRepository;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/carts/:session_id", get(get_cart))
        .route("/carts/:session_id/items", post(add_item))
        .route(
            "/carts/:session_id/items/:item_id",
            put(update_item).delete(remove_item),
        )
        .route("/carts/:session_id/details", put(update_details))
        .route("/carts/:session_id/checkout-state", get(checkout_state))
}

/// Build the client-facing cart view, loading items and deriving the total
/// when no provider total has been frozen on the cart yet.
pub async fn build_cart_view(
    repo: &CartRepository,
    cart: CartEntity,
) -> Result<CartView, ApiError> {
    let items = repo.list_items_with_gifts(cart.id).await?;
    let computed: Decimal = items.iter().map(|i| i.line_total()).sum();

    let item_views: Vec<CartItemView> = items
        .into_iter()
        .map(|i| CartItemView {
            id: i.id,
            gift_id: i.gift_id,
            gift_name: i.gift_name.clone(),
            quantity: i.quantity,
            unit_price: i.unit_price(),
            line_total: i.line_total(),
        })
        .collect();

    Ok(CartView {
        id: cart.id,
        session_id: cart.session_id,
        total_amount: cart.total_amount.unwrap_or(computed),
        currency: cart.currency,
        payment_type: cart.payment_type.map(Into::into),
        is_paid: cart.is_paid,
        paid_at: cart.paid_at,
        invitee_name: cart.invitee_name,
        invitee_email: cart.invitee_email,
        invitee_phone: cart.invitee_phone,
        message: cart.message,
        items: item_views,
    })
}

/// Loads the cart for a session, rejecting mutations of paid carts.
async fn load_mutable_cart(
    repo: &CartRepository,
    session_id: &str,
) -> Result<CartEntity, ApiError> {
    let cart = repo
        .find_by_session(session_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;
    if cart.is_paid {
        return Err(ApiError::Conflict("Cart is already paid".to_string()));
    }
    Ok(cart)
}

async fn get_cart(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<CartView>, ApiError> {
    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(&session_id).await?;
    Ok(Json(build_cart_view(&repo, cart).await?))
}

async fn add_item(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<AddCartItemRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let repo = CartRepository::new(state.pool.clone());
    let cart = repo.get_or_create(&session_id).await?;
    if cart.is_paid {
        return Err(ApiError::Conflict("Cart is already paid".to_string()));
    }

    // RowNotFound here means the gift does not exist.
    repo.add_item(cart.id, request.gift_id, request.quantity)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::NotFound("Gift not found".to_string()),
            other => other.into(),
        })?;

    let view = build_cart_view(&repo, cart).await?;
    Ok((StatusCode::CREATED, Json(view)).into_response())
}

async fn update_item(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, Uuid)>,
    Json(request): Json<UpdateCartItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    request.validate()?;

    let repo = CartRepository::new(state.pool.clone());
    let cart = load_mutable_cart(&repo, &session_id).await?;

    repo.update_item_quantity(cart.id, item_id, request.quantity)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::NotFound("Cart item not found".to_string()),
            other => other.into(),
        })?;

    Ok(Json(build_cart_view(&repo, cart).await?))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((session_id, item_id)): Path<(String, Uuid)>,
) -> Result<Json<CartView>, ApiError> {
    let repo = CartRepository::new(state.pool.clone());
    let cart = load_mutable_cart(&repo, &session_id).await?;

    let removed = repo.remove_item(cart.id, item_id).await?;
    if removed == 0 {
        return Err(ApiError::NotFound("Cart item not found".to_string()));
    }

    Ok(Json(build_cart_view(&repo, cart).await?))
}

async fn update_details(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<UpdateCartDetailsRequest>,
) -> Result<Json<CartView>, ApiError> {
    request.validate()?;

    let repo = CartRepository::new(state.pool.clone());
    let cart = load_mutable_cart(&repo, &session_id).await?;

    let updated = repo
        .update_details(
            cart.id,
            &request.invitee_name,
            &request.invitee_email,
            request.invitee_phone.as_deref(),
            request.message.as_deref(),
        )
        .await?;

    Ok(Json(build_cart_view(&repo, updated).await?))
}

/// Server-derived checkout state: the cart plus any provider-return query
/// parameters determine where the guest is in the flow.
async fn checkout_state(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(params): Query<ProviderReturnParams>,
) -> Result<Json<CheckoutStateResponse>, ApiError> {
    let repo = CartRepository::new(state.pool.clone());

    let facts = match repo.find_by_session(&session_id).await? {
        Some(cart) => CartCheckoutFacts {
            has_items: repo.count_items(cart.id).await? > 0,
            has_payment_id: cart.payment_id.is_some(),
            is_paid: cart.is_paid,
        },
        None => CartCheckoutFacts {
            has_items: false,
            has_payment_id: false,
            is_paid: false,
        },
    };

    Ok(Json(CheckoutStateResponse {
        state: derive_checkout_state(facts, &params),
    }))
}
