//! Gift management and direct purchase endpoints.
//!
//! Gift CRUD is couple-scoped: a couple may only touch gifts on their own
//! wedding lists. Availability is quantity-aware and the purchase path is
//! guarded in the database, so the last unit can only be bought once.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{post, put};
use axum::{Json, Router};
use domain::models::gift::{
    CreateGiftRequest, PurchaseGiftRequest, PurchaseGiftResponse, UpdateGiftRequest,
};
use domain::models::GiftSummary;
use persistence::entities::GiftEntity;
use persistence::repositories::gift_purchase::PurchaseAttempt;
use persistence::repositories::{GiftPurchaseRepository, GiftRepository, WeddingListRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::middleware::metrics::record_gift_purchased;

const DEFAULT_CURRENCY: &str = "USD";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/gifts/:id", put(update_gift).delete(delete_gift))
        .route("/gifts/:id/purchase", post(purchase_gift))
        .route("/purchases/:id/confirm", post(confirm_purchase))
}

pub fn to_gift_summary(entity: GiftEntity) -> GiftSummary {
    GiftSummary {
        id: entity.id,
        wedding_list_id: entity.wedding_list_id,
        name: entity.name,
        description: entity.description,
        price: entity.price,
        currency: entity.currency,
        image_url: entity.image_url,
        category: entity.category,
        quantity: entity.quantity,
        purchased_quantity: entity.purchased_quantity,
        is_purchased: GiftSummary::derive_is_purchased(entity.quantity, entity.purchased_quantity),
        created_at: entity.created_at,
    }
}

/// Loads a gift and checks the caller owns its wedding list. Admins bypass
/// the ownership check.
async fn load_owned_gift(
    state: &AppState,
    auth: &UserAuth,
    gift_id: Uuid,
) -> Result<GiftEntity, ApiError> {
    let gifts = GiftRepository::new(state.pool.clone());
    let gift = gifts
        .find_by_id(gift_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Gift not found".to_string()))?;

    if !auth.role.is_admin() {
        let lists = WeddingListRepository::new(state.pool.clone());
        let list = lists
            .find_by_id(gift.wedding_list_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Wedding list not found".to_string()))?;
        if list.couple_id != auth.user_id {
            return Err(ApiError::Forbidden(
                "You do not own this wedding list".to_string(),
            ));
        }
    }

    Ok(gift)
}

/// Create a gift on a wedding list. Mounted by the wedding list router so the
/// list id comes from the path.
pub async fn create_gift(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(list_id): Path<Uuid>,
    Json(request): Json<CreateGiftRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let lists = WeddingListRepository::new(state.pool.clone());
    let list = lists
        .find_by_id(list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wedding list not found".to_string()))?;
    if !auth.role.is_admin() && list.couple_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this wedding list".to_string(),
        ));
    }

    let gifts = GiftRepository::new(state.pool.clone());
    let gift = gifts
        .create(
            list.id,
            &request.name,
            request.description.as_deref(),
            request.price,
            request.currency.as_deref().unwrap_or(DEFAULT_CURRENCY),
            request.image_url.as_deref(),
            request.category.as_deref(),
            request.quantity.unwrap_or(1),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_gift_summary(gift))).into_response())
}

/// List the gifts on a wedding list for the couple's dashboard.
pub async fn list_gifts(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(list_id): Path<Uuid>,
) -> Result<Json<Vec<GiftSummary>>, ApiError> {
    let lists = WeddingListRepository::new(state.pool.clone());
    let list = lists
        .find_by_id(list_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wedding list not found".to_string()))?;
    if !auth.role.is_admin() && list.couple_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this wedding list".to_string(),
        ));
    }

    let gifts = GiftRepository::new(state.pool.clone());
    let summaries = gifts
        .list_for_wedding_list(list.id)
        .await?
        .into_iter()
        .map(to_gift_summary)
        .collect();

    Ok(Json(summaries))
}

async fn update_gift(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateGiftRequest>,
) -> Result<Json<GiftSummary>, ApiError> {
    request.validate()?;

    let gift = load_owned_gift(&state, &auth, id).await?;

    if let Some(quantity) = request.quantity {
        if quantity < gift.purchased_quantity {
            return Err(ApiError::Validation(format!(
                "Quantity cannot drop below the {} units already purchased",
                gift.purchased_quantity
            )));
        }
    }

    let gifts = GiftRepository::new(state.pool.clone());
    let updated = gifts
        .update(
            gift.id,
            request.name.as_deref(),
            request.description.as_deref(),
            request.price,
            request.image_url.as_deref(),
            request.category.as_deref(),
            request.quantity,
        )
        .await?;

    Ok(Json(to_gift_summary(updated)))
}

async fn delete_gift(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let gift = load_owned_gift(&state, &auth, id).await?;

    let gifts = GiftRepository::new(state.pool.clone());
    gifts.delete(gift.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

async fn purchase_gift(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<PurchaseGiftRequest>,
) -> Result<Json<PurchaseGiftResponse>, ApiError> {
    request.validate()?;

    let gifts = GiftRepository::new(state.pool.clone());
    if gifts.find_by_id(id).await?.is_none() {
        return Err(ApiError::NotFound("Gift not found".to_string()));
    }

    let purchases = GiftPurchaseRepository::new(state.pool.clone());
    match purchases
        .record_purchase(id, auth.user_id, request.message.as_deref())
        .await?
    {
        PurchaseAttempt::Recorded { purchase, gift } => {
            record_gift_purchased();
            tracing::info!(gift_id = %gift.id, purchase_id = %purchase.id, "Gift purchased");
            Ok(Json(PurchaseGiftResponse {
                purchase_id: purchase.id,
                gift_id: gift.id,
                status: purchase.status.into(),
                purchased_quantity: gift.purchased_quantity,
                quantity: gift.quantity,
            }))
        }
        PurchaseAttempt::SoldOut => Err(ApiError::Validation(
            "Gift is already fully purchased".to_string(),
        )),
    }
}

async fn confirm_purchase(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseGiftResponse>, ApiError> {
    auth.require_admin()?;

    let purchases = GiftPurchaseRepository::new(state.pool.clone());
    let purchase = purchases.confirm(id).await.map_err(|e| match e {
        sqlx::Error::RowNotFound => ApiError::NotFound("Purchase not found".to_string()),
        other => other.into(),
    })?;

    let gifts = GiftRepository::new(state.pool.clone());
    let gift = gifts
        .find_by_id(purchase.gift_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Gift not found".to_string()))?;

    Ok(Json(PurchaseGiftResponse {
        purchase_id: purchase.id,
        gift_id: gift.id,
        status: purchase.status.into(),
        purchased_quantity: gift.purchased_quantity,
        quantity: gift.quantity,
    }))
}
