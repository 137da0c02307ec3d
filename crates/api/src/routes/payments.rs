//! Payment endpoints: initiate, verify (capture), cancel, summary and the
//! admin ledger listing.
//!
//! `Cart.is_paid` is the single source of truth. Verification is idempotent:
//! repeating it against a paid cart returns the existing ledger row and makes
//! no provider call.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::models::payment::{
    CancelPaymentRequest, InitiatePaymentRequest, InitiatePaymentResponse, ListPaymentsResponse,
    PaymentSummary, VerifyPaymentRequest, VerifyPaymentResponse,
};
use domain::models::{CartItemView, MoneyBag, PaymentType};
use domain::services::{CheckoutLineItem, SessionRequest};
use persistence::entities::MoneyBagEntity;
use persistence::repositories::{CartRepository, MoneyBagRepository};
use persistence::repositories::money_bag::CaptureRecord;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_payment_captured;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments))
        .route("/payments/initiate", post(initiate_payment))
        .route("/payments/verify", post(verify_payment))
        .route("/payments/cancel", post(cancel_payment))
        .route("/payments/:id/summary", get(payment_summary))
}

fn to_money_bag(entity: MoneyBagEntity) -> MoneyBag {
    MoneyBag {
        id: entity.id,
        cart_id: entity.cart_id,
        provider: entity.provider.into(),
        payment_id: entity.payment_id,
        amount: entity.amount,
        currency: entity.currency,
        fee: entity.fee,
        payer_name: entity.payer_name,
        payer_email: entity.payer_email,
        created_at: entity.created_at,
    }
}

fn provider_label(payment_type: PaymentType) -> &'static str {
    match payment_type {
        PaymentType::Stripe => "stripe",
        PaymentType::Paypal => "paypal",
    }
}

async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentRequest>,
) -> Result<Json<InitiatePaymentResponse>, ApiError> {
    request.validate()?;

    let payment_type = request
        .payment_type
        .parse::<PaymentType>()
        .map_err(ApiError::Validation)?;

    let carts = CartRepository::new(state.pool.clone());
    let cart = carts
        .find_by_id(request.cart_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;
    if cart.is_paid {
        return Err(ApiError::Conflict("Cart is already paid".to_string()));
    }

    let items = carts.list_items_with_gifts(cart.id).await?;
    if items.is_empty() {
        return Err(ApiError::Validation("Cart is empty".to_string()));
    }

    let currency = items[0].gift_currency.clone();
    let line_items: Vec<CheckoutLineItem> = items
        .iter()
        .map(|item| {
            Ok(CheckoutLineItem {
                name: item.gift_name.clone(),
                unit_amount_minor: shared::money::to_minor_units(item.unit_price(), &currency)?,
                quantity: i64::from(item.quantity),
            })
        })
        .collect::<Result<_, shared::money::MoneyError>>()?;

    let total = carts.compute_total(cart.id).await?;
    let total_minor = shared::money::to_minor_units(total, &currency)?;

    let session = state
        .gateway(payment_type)
        .create_session(&SessionRequest {
            cart_id: cart.id,
            total_minor,
            currency: currency.clone(),
            line_items,
            return_url: request.return_url.clone(),
            cancel_url: request.cancel_url.clone(),
        })
        .await?;

    carts
        .set_payment(cart.id, payment_type, &session.payment_id, total, &currency)
        .await?;

    tracing::info!(
        cart_id = %cart.id,
        provider = provider_label(payment_type),
        payment_id = %session.payment_id,
        "Payment initiated"
    );

    Ok(Json(InitiatePaymentResponse {
        success: true,
        payment_id: session.payment_id,
        approval_url: session.approval_url,
    }))
}

async fn verify_payment(
    State(state): State<AppState>,
    Json(request): Json<VerifyPaymentRequest>,
) -> Result<Json<VerifyPaymentResponse>, ApiError> {
    let carts = CartRepository::new(state.pool.clone());
    let bags = MoneyBagRepository::new(state.pool.clone());

    let cart = carts
        .find_by_payment_id(&request.payment_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    // Already paid: return the existing ledger row without a provider call.
    if cart.is_paid {
        let bag = bags
            .find_latest_for_cart(cart.id)
            .await?
            .ok_or_else(|| ApiError::Internal("Paid cart has no ledger record".to_string()))?;
        return Ok(Json(VerifyPaymentResponse {
            success: true,
            money_bag_id: bag.id,
            cart_id: cart.id,
            already_captured: true,
        }));
    }

    let outcome = state
        .gateway(request.payment_type)
        .capture(&request.payment_id, request.payer_id.as_deref())
        .await?;

    let record = bags
        .record_capture(
            cart.id,
            request.payment_type,
            &request.payment_id,
            outcome.amount,
            &outcome.currency,
            outcome.fee,
            outcome.payer_name.as_deref(),
            outcome.payer_email.as_deref(),
            outcome.raw_response,
        )
        .await?;

    let (bag, already_captured) = match record {
        CaptureRecord::Captured(bag) => (bag, false),
        CaptureRecord::AlreadyCaptured(bag) => (bag, true),
    };

    if !already_captured {
        record_payment_captured(provider_label(request.payment_type));
        tracing::info!(
            cart_id = %cart.id,
            money_bag_id = %bag.id,
            amount = %bag.amount,
            currency = %bag.currency,
            "Payment captured"
        );
        send_confirmation(&state, &carts, &cart.id, &bag).await;
    }

    Ok(Json(VerifyPaymentResponse {
        success: true,
        money_bag_id: bag.id,
        cart_id: cart.id,
        already_captured,
    }))
}

/// Best-effort confirmation email; failures are logged, never surfaced.
async fn send_confirmation(
    state: &AppState,
    carts: &CartRepository,
    cart_id: &Uuid,
    bag: &MoneyBagEntity,
) {
    let cart = match carts.find_by_id(*cart_id).await {
        Ok(Some(cart)) => cart,
        _ => return,
    };
    let Some(email) = cart.invitee_email else {
        return;
    };

    let item_names: Vec<String> = match carts.list_items_with_gifts(*cart_id).await {
        Ok(items) => items.into_iter().map(|i| i.gift_name).collect(),
        Err(_) => Vec::new(),
    };

    if let Err(e) = state
        .email
        .send_purchase_confirmation(
            &email,
            cart.invitee_name.as_deref(),
            bag.amount,
            &bag.currency,
            &item_names,
        )
        .await
    {
        tracing::warn!(cart_id = %cart_id, error = %e, "Confirmation email failed");
    }
}

async fn cancel_payment(
    State(state): State<AppState>,
    Json(request): Json<CancelPaymentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let carts = CartRepository::new(state.pool.clone());
    let cart = carts
        .find_by_id(request.cart_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Cart not found".to_string()))?;
    if cart.is_paid {
        return Err(ApiError::Conflict(
            "Cart is already paid and cannot be cancelled".to_string(),
        ));
    }

    // The repository re-checks is_paid; a capture racing this cancel wins.
    let cleared = carts.clear_payment(cart.id).await?;
    if cleared.is_none() {
        return Err(ApiError::Conflict(
            "Cart is already paid and cannot be cancelled".to_string(),
        ));
    }

    tracing::info!(cart_id = %cart.id, "Payment cancelled");
    Ok(Json(serde_json::json!({ "success": true })))
}

async fn payment_summary(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentSummary>, ApiError> {
    let bags = MoneyBagRepository::new(state.pool.clone());
    let carts = CartRepository::new(state.pool.clone());

    let bag = bags
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Payment not found".to_string()))?;

    let cart = carts
        .find_by_id(bag.cart_id)
        .await?
        .ok_or_else(|| ApiError::Internal("Ledger row points at a missing cart".to_string()))?;

    let items: Vec<CartItemView> = carts
        .list_items_with_gifts(cart.id)
        .await?
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

    Ok(Json(PaymentSummary {
        money_bag: to_money_bag(bag),
        invitee_name: cart.invitee_name,
        message: cart.message,
        items,
    }))
}

#[derive(Debug, Deserialize)]
struct ListPaymentsQuery {
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_limit() -> i64 {
    50
}

async fn list_payments(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListPaymentsQuery>,
) -> Result<Json<ListPaymentsResponse>, ApiError> {
    auth.require_admin()?;

    let limit = query.limit.clamp(1, 200);
    let offset = query.offset.max(0);

    let bags = MoneyBagRepository::new(state.pool.clone());
    let data = bags
        .list_all(limit, offset)
        .await?
        .into_iter()
        .map(to_money_bag)
        .collect();

    Ok(Json(ListPaymentsResponse { data }))
}
