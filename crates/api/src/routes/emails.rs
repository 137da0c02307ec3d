//! Admin endpoints for marketing email: send, preview and the eligible
//! recipient listing.

use std::collections::HashSet;

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use domain::models::email::{
    EmailPreview, MarketingSendError, PreviewEmailQuery, SendMarketingEmailRequest,
    SendMarketingEmailResponse,
};
use domain::models::user::UserSummary;
use persistence::repositories::UserRepository;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/emails/marketing/send", post(send_marketing))
        .route("/admin/emails/marketing/preview", get(preview_marketing))
        .route("/admin/users/marketing-eligible", get(marketing_eligible))
}

/// Send a marketing template to the selected users. Recipients without an
/// opt-in or without an account come back as per-user failures; one bad
/// recipient never aborts the batch.
async fn send_marketing(
    State(state): State<AppState>,
    auth: UserAuth,
    Json(request): Json<SendMarketingEmailRequest>,
) -> Result<Json<SendMarketingEmailResponse>, ApiError> {
    auth.require_admin()?;
    request.validate()?;

    let users = UserRepository::new(state.pool.clone());
    let found = users.find_by_ids(&request.user_ids).await?;
    let found_ids: HashSet<Uuid> = found.iter().map(|u| u.id).collect();

    let mut sent = 0u32;
    let mut failed = Vec::new();

    for id in &request.user_ids {
        if !found_ids.contains(id) {
            failed.push(MarketingSendError {
                user_id: *id,
                error: "User not found or inactive".to_string(),
            });
        }
    }

    for user in &found {
        if !user.marketing_opt_in {
            failed.push(MarketingSendError {
                user_id: user.id,
                error: "User has not opted in to marketing email".to_string(),
            });
            continue;
        }

        match state
            .email
            .send_marketing(&user.email, user.display_name.as_deref(), request.email_type)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => failed.push(MarketingSendError {
                user_id: user.id,
                error: e.to_string(),
            }),
        }
    }

    tracing::info!(
        email_type = ?request.email_type,
        sent,
        failed = failed.len(),
        "Marketing email dispatched"
    );

    Ok(Json(SendMarketingEmailResponse { sent, failed }))
}

/// Render a marketing template for one user without sending anything.
async fn preview_marketing(
    State(state): State<AppState>,
    auth: UserAuth,
    Query(query): Query<PreviewEmailQuery>,
) -> Result<Json<EmailPreview>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(query.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let (subject, body_text) = state
        .email
        .render_marketing(query.email_type, user.display_name.as_deref());

    Ok(Json(EmailPreview {
        to: user.email,
        subject,
        body_text,
    }))
}

async fn marketing_eligible(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    auth.require_admin()?;

    let users = UserRepository::new(state.pool.clone());
    let data = users
        .list_marketing_eligible()
        .await?
        .into_iter()
        .map(|u| UserSummary {
            id: u.id,
            email: u.email,
            display_name: u.display_name,
            role: u.role.into(),
            created_at: u.created_at,
        })
        .collect();

    Ok(Json(data))
}
