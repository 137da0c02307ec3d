//! Wedding list endpoints: couple-scoped CRUD plus the public registry page.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use domain::models::wedding_list::{
    CreateWeddingListRequest, PublicRegistry, UpdateWeddingListRequest,
};
use domain::models::WeddingList;
use persistence::entities::WeddingListEntity;
use persistence::repositories::{GiftRepository, WeddingListRepository};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::routes::gifts;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wedding-lists", get(list_wedding_lists).post(create_wedding_list))
        .route(
            "/wedding-lists/:id",
            get(get_wedding_list)
                .put(update_wedding_list)
                .delete(delete_wedding_list),
        )
        .route(
            "/wedding-lists/:id/gifts",
            get(gifts::list_gifts).post(gifts::create_gift),
        )
        .route("/registry/:slug", get(public_registry))
}

fn to_wedding_list(entity: WeddingListEntity) -> WeddingList {
    WeddingList {
        id: entity.id,
        couple_id: entity.couple_id,
        title: entity.title,
        slug: entity.slug,
        description: entity.description,
        event_date: entity.event_date,
        created_at: entity.created_at,
        updated_at: entity.updated_at,
    }
}

/// Loads a list and checks ownership. Admins bypass the check.
async fn load_owned_list(
    state: &AppState,
    auth: &UserAuth,
    id: Uuid,
) -> Result<WeddingListEntity, ApiError> {
    let lists = WeddingListRepository::new(state.pool.clone());
    let list = lists
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Wedding list not found".to_string()))?;
    if !auth.role.is_admin() && list.couple_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "You do not own this wedding list".to_string(),
        ));
    }
    Ok(list)
}

async fn create_wedding_list(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateWeddingListRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let lists = WeddingListRepository::new(state.pool.clone());
    let slug = lists.generate_unique_slug(&request.slug).await?;

    let list = lists
        .create(
            auth.user_id,
            &request.title,
            &slug,
            request.description.as_deref(),
            request.event_date,
        )
        .await?;

    tracing::info!(list_id = %list.id, slug = %list.slug, "Wedding list created");
    Ok((StatusCode::CREATED, Json(to_wedding_list(list))).into_response())
}

async fn list_wedding_lists(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<WeddingList>>, ApiError> {
    let lists = WeddingListRepository::new(state.pool.clone());
    let data = lists
        .list_for_couple(auth.user_id)
        .await?
        .into_iter()
        .map(to_wedding_list)
        .collect();
    Ok(Json(data))
}

async fn get_wedding_list(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<Json<WeddingList>, ApiError> {
    let list = load_owned_list(&state, &auth, id).await?;
    Ok(Json(to_wedding_list(list)))
}

async fn update_wedding_list(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateWeddingListRequest>,
) -> Result<Json<WeddingList>, ApiError> {
    request.validate()?;

    let list = load_owned_list(&state, &auth, id).await?;

    let lists = WeddingListRepository::new(state.pool.clone());
    let updated = lists
        .update(
            list.id,
            request.title.as_deref(),
            request.description.as_deref(),
            request.event_date,
        )
        .await?;

    Ok(Json(to_wedding_list(updated)))
}

async fn delete_wedding_list(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let list = load_owned_list(&state, &auth, id).await?;

    let lists = WeddingListRepository::new(state.pool.clone());
    lists.delete(list.id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Public registry page for guests: list info plus its gifts, no auth.
async fn public_registry(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicRegistry>, ApiError> {
    let lists = WeddingListRepository::new(state.pool.clone());
    let list = lists
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("Registry not found".to_string()))?;

    let gift_repo = GiftRepository::new(state.pool.clone());
    let gift_summaries = gift_repo
        .list_for_wedding_list(list.id)
        .await?
        .into_iter()
        .map(gifts::to_gift_summary)
        .collect();

    Ok(Json(PublicRegistry {
        title: list.title,
        slug: list.slug,
        description: list.description,
        event_date: list.event_date,
        gifts: gift_summaries,
    }))
}
