//! Invitee entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::InviteeStatus;
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invitee_status that maps to PostgreSQL enum type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invitee_status", rename_all = "lowercase")]
pub enum InviteeStatusDb {
    Pending,
    Confirmed,
    Rejected,
}

impl From<InviteeStatusDb> for InviteeStatus {
    fn from(db: InviteeStatusDb) -> Self {
        match db {
            InviteeStatusDb::Pending => InviteeStatus::Pending,
            InviteeStatusDb::Confirmed => InviteeStatus::Confirmed,
            InviteeStatusDb::Rejected => InviteeStatus::Rejected,
        }
    }
}

impl From<InviteeStatus> for InviteeStatusDb {
    fn from(status: InviteeStatus) -> Self {
        match status {
            InviteeStatus::Pending => InviteeStatusDb::Pending,
            InviteeStatus::Confirmed => InviteeStatusDb::Confirmed,
            InviteeStatus::Rejected => InviteeStatusDb::Rejected,
        }
    }
}

/// Database row mapping for the invitees table.
#[derive(Debug, Clone, FromRow)]
pub struct InviteeEntity {
    pub id: Uuid,
    pub couple_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub secret_code: String,
    pub status: InviteeStatusDb,
    pub tickets: i32,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
