//! Gift purchase entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::PurchaseStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for purchase_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "purchase_status", rename_all = "lowercase")]
pub enum PurchaseStatusDb {
    Pending,
    Confirmed,
}

impl From<PurchaseStatusDb> for PurchaseStatus {
    fn from(db: PurchaseStatusDb) -> Self {
        match db {
            PurchaseStatusDb::Pending => PurchaseStatus::Pending,
            PurchaseStatusDb::Confirmed => PurchaseStatus::Confirmed,
        }
    }
}

impl From<PurchaseStatus> for PurchaseStatusDb {
    fn from(status: PurchaseStatus) -> Self {
        match status {
            PurchaseStatus::Pending => PurchaseStatusDb::Pending,
            PurchaseStatus::Confirmed => PurchaseStatusDb::Confirmed,
        }
    }
}

/// Database row mapping for the gift_purchases table.
#[derive(Debug, Clone, FromRow)]
pub struct GiftPurchaseEntity {
    pub id: Uuid,
    pub gift_id: Uuid,
    pub user_id: Uuid,
    pub message: Option<String>,
    pub status: PurchaseStatusDb,
    pub created_at: DateTime<Utc>,
}
