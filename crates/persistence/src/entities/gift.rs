//! Gift entity (database row mapping).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the gifts table.
#[derive(Debug, Clone, FromRow)]
pub struct GiftEntity {
    pub id: Uuid,
    pub wedding_list_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub currency: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub quantity: i32,
    pub purchased_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
