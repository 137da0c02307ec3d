//! Invitee (RSVP) endpoints.
//!
//! Couples manage their guest list behind authentication; guests respond
//! through a secret code with no account at all.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use domain::models::invitee::{
    is_valid_secret_code, BulkCountResponse, BulkCreateInviteesRequest, BulkCreateInviteesResponse,
    BulkDeleteInviteesRequest, BulkInviteeError, BulkUpdateInviteeStatusRequest,
    CreateInviteeRequest, PublicInviteeInfo, RsvpRequest, UpdateInviteeRequest,
};
use domain::models::{InviteeStatus, InviteeView};
use persistence::entities::InviteeEntity;
use persistence::repositories::InviteeRepository;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invitees", get(list_invitees).post(create_invitee))
        .route("/invitees/bulk", post(bulk_create))
        .route("/invitees/bulk-delete", post(bulk_delete))
        .route("/invitees/bulk-status", post(bulk_status))
        .route("/invitees/stats", get(invitee_stats))
        .route("/invitees/:id", put(update_invitee).delete(delete_invitee))
        .route("/rsvp/:code", get(rsvp_lookup).post(rsvp_respond))
}

fn to_invitee_view(entity: InviteeEntity) -> InviteeView {
    InviteeView {
        id: entity.id,
        name: entity.name,
        email: entity.email,
        phone: entity.phone,
        secret_code: entity.secret_code,
        status: entity.status.into(),
        tickets: entity.tickets,
        responded_at: entity.responded_at,
        created_at: entity.created_at,
    }
}

#[derive(Debug, Deserialize)]
struct ListInviteesQuery {
    status: Option<InviteeStatus>,
}

async fn list_invitees(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<ListInviteesQuery>,
) -> Result<Json<Vec<InviteeView>>, ApiError> {
    let repo = InviteeRepository::new(state.pool.clone());
    let data = repo
        .list_for_couple(auth.user_id, query.status)
        .await?
        .into_iter()
        .map(to_invitee_view)
        .collect();
    Ok(Json(data))
}

async fn create_invitee(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<CreateInviteeRequest>,
) -> Result<Response, ApiError> {
    request.validate()?;

    let repo = InviteeRepository::new(state.pool.clone());
    let invitee = repo
        .create(
            auth.user_id,
            &request.name,
            request.email.as_deref(),
            request.phone.as_deref(),
            request.tickets.unwrap_or(1),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(to_invitee_view(invitee))).into_response())
}

/// Bulk create: rows are validated and inserted independently so one bad row
/// does not sink the rest. Failures come back with their 1-based row number.
async fn bulk_create(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<BulkCreateInviteesRequest>,
) -> Result<Response, ApiError> {
    if request.invitees.is_empty() || request.invitees.len() > 500 {
        return Err(ApiError::Validation("Provide 1-500 invitees".to_string()));
    }

    let repo = InviteeRepository::new(state.pool.clone());
    let mut created = Vec::new();
    let mut errors = Vec::new();

    for (index, row) in request.invitees.iter().enumerate() {
        if let Err(e) = row.validate() {
            errors.push(BulkInviteeError {
                row: index + 1,
                name: row.name.clone(),
                error: crate::error::validation_message(&e),
            });
            continue;
        }

        match repo
            .create(
                auth.user_id,
                &row.name,
                row.email.as_deref(),
                row.phone.as_deref(),
                row.tickets.unwrap_or(1),
            )
            .await
        {
            Ok(invitee) => created.push(to_invitee_view(invitee)),
            Err(e) => errors.push(BulkInviteeError {
                row: index + 1,
                name: row.name.clone(),
                error: e.to_string(),
            }),
        }
    }

    tracing::info!(
        couple_id = %auth.user_id,
        created = created.len(),
        failed = errors.len(),
        "Bulk invitee create"
    );

    Ok((
        StatusCode::CREATED,
        Json(BulkCreateInviteesResponse { created, errors }),
    )
        .into_response())
}

async fn bulk_delete(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<BulkDeleteInviteesRequest>,
) -> Result<Json<BulkCountResponse>, ApiError> {
    request.validate()?;

    let repo = InviteeRepository::new(state.pool.clone());
    let count = repo.bulk_delete(auth.user_id, &request.ids).await?;
    Ok(Json(BulkCountResponse { count }))
}

async fn bulk_status(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<BulkUpdateInviteeStatusRequest>,
) -> Result<Json<BulkCountResponse>, ApiError> {
    request.validate()?;

    let repo = InviteeRepository::new(state.pool.clone());
    let count = repo
        .bulk_set_status(auth.user_id, &request.ids, request.status)
        .await?;
    Ok(Json(BulkCountResponse { count }))
}

async fn invitee_stats(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<serde_json::Value>, ApiError> {
    let repo = InviteeRepository::new(state.pool.clone());
    let confirmed_tickets = repo.confirmed_ticket_count(auth.user_id).await?;
    Ok(Json(
        serde_json::json!({ "confirmed_tickets": confirmed_tickets }),
    ))
}

/// Loads an invitee and checks it belongs to the caller.
async fn load_owned_invitee(
    repo: &InviteeRepository,
    auth: &UserAuth,
    id: Uuid,
) -> Result<InviteeEntity, ApiError> {
    let invitee = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitee not found".to_string()))?;
    if invitee.couple_id != auth.user_id && !auth.role.is_admin() {
        return Err(ApiError::Forbidden(
            "You do not own this invitee".to_string(),
        ));
    }
    Ok(invitee)
}

async fn update_invitee(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInviteeRequest>,
) -> Result<Json<InviteeView>, ApiError> {
    request.validate()?;

    let repo = InviteeRepository::new(state.pool.clone());
    let invitee = load_owned_invitee(&repo, &auth, id).await?;

    let updated = repo
        .update(
            invitee.id,
            request.name.as_deref(),
            request.email.as_deref(),
            request.phone.as_deref(),
            request.tickets,
        )
        .await?;

    // A status change also stamps responded_at, matching the RSVP path.
    let updated = if let Some(status) = request.status {
        repo.set_status(updated.id, status, None).await?
    } else {
        updated
    };

    Ok(Json(to_invitee_view(updated)))
}

async fn delete_invitee(
    State(state): State<AppState>,
    auth: UserAuth,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let repo = InviteeRepository::new(state.pool.clone());
    let invitee = load_owned_invitee(&repo, &auth, id).await?;

    repo.delete(invitee.id, invitee.couple_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public lookup of an invitation by its secret code.
async fn rsvp_lookup(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<PublicInviteeInfo>, ApiError> {
    let code = code.trim().to_uppercase();
    if !is_valid_secret_code(&code) {
        return Err(ApiError::NotFound("Invitation not found".to_string()));
    }

    let repo = InviteeRepository::new(state.pool.clone());
    let invitee = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    Ok(Json(PublicInviteeInfo {
        name: invitee.name,
        status: invitee.status.into(),
        tickets: invitee.tickets,
    }))
}

/// Public RSVP submission against a secret code.
async fn rsvp_respond(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(request): Json<RsvpRequest>,
) -> Result<Json<PublicInviteeInfo>, ApiError> {
    request.validate()?;

    let code = code.trim().to_uppercase();
    if !is_valid_secret_code(&code) {
        return Err(ApiError::NotFound("Invitation not found".to_string()));
    }

    let repo = InviteeRepository::new(state.pool.clone());
    let invitee = repo
        .find_by_code(&code)
        .await?
        .ok_or_else(|| ApiError::NotFound("Invitation not found".to_string()))?;

    let updated = repo
        .set_status(invitee.id, request.status, request.tickets)
        .await?;

    tracing::info!(invitee_id = %updated.id, status = %request.status, "RSVP recorded");

    Ok(Json(PublicInviteeInfo {
        name: updated.name,
        status: updated.status.into(),
        tickets: updated.tickets,
    }))
}
