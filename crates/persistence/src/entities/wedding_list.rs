//! Wedding list entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the wedding_lists table.
#[derive(Debug, Clone, FromRow)]
pub struct WeddingListEntity {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub event_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
