//! Invitee repository for database operations.

use domain::models::invitee::generate_secret_code;
use domain::models::InviteeStatus;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{InviteeEntity, InviteeStatusDb};
use crate::metrics::QueryTimer;

const INVITEE_COLUMNS: &str = "id, couple_id, name, email, phone, secret_code, status, tickets, \
     responded_at, created_at, updated_at";

/// Repository for invitee database operations.
#[derive(Clone)]
pub struct InviteeRepository {
    pool: PgPool,
}

impl InviteeRepository {
    /// Creates a new InviteeRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an invitee with a freshly generated secret code.
    ///
    /// Code collisions are rare but possible, so the insert retries with a new
    /// code on a unique violation.
    pub async fn create(
        &self,
        couple_id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: Option<&str>,
        tickets: i32,
    ) -> Result<InviteeEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitee");

        let mut attempts = 0;
        let result = loop {
            let code = generate_secret_code();
            let inserted = sqlx::query_as::<_, InviteeEntity>(&format!(
                r#"
                INSERT INTO invitees (couple_id, name, email, phone, secret_code, tickets)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {INVITEE_COLUMNS}
                "#,
            ))
            .bind(couple_id)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind(&code)
            .bind(tickets)
            .fetch_one(&self.pool)
            .await;

            match inserted {
                Err(sqlx::Error::Database(ref db_err))
                    if db_err.constraint() == Some("invitees_secret_code_key")
                        && attempts < 5 =>
                {
                    attempts += 1;
                    continue;
                }
                other => break other,
            }
        };

        timer.record();
        result
    }

    /// Find an invitee by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<InviteeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitee_by_id");
        let result = sqlx::query_as::<_, InviteeEntity>(&format!(
            r#"
            SELECT {INVITEE_COLUMNS}
            FROM invitees
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an invitee by secret code.
    pub async fn find_by_code(&self, code: &str) -> Result<Option<InviteeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitee_by_code");
        let result = sqlx::query_as::<_, InviteeEntity>(&format!(
            r#"
            SELECT {INVITEE_COLUMNS}
            FROM invitees
            WHERE secret_code = $1
            "#,
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List a couple's invitees, optionally filtered by status.
    pub async fn list_for_couple(
        &self,
        couple_id: Uuid,
        status_filter: Option<InviteeStatus>,
    ) -> Result<Vec<InviteeEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitees_for_couple");

        let result = if let Some(status) = status_filter {
            let status_db: InviteeStatusDb = status.into();
            sqlx::query_as::<_, InviteeEntity>(&format!(
                r#"
                SELECT {INVITEE_COLUMNS}
                FROM invitees
                WHERE couple_id = $1 AND status = $2
                ORDER BY name ASC
                "#,
            ))
            .bind(couple_id)
            .bind(status_db)
            .fetch_all(&self.pool)
            .await
        } else {
            sqlx::query_as::<_, InviteeEntity>(&format!(
                r#"
                SELECT {INVITEE_COLUMNS}
                FROM invitees
                WHERE couple_id = $1
                ORDER BY name ASC
                "#,
            ))
            .bind(couple_id)
            .fetch_all(&self.pool)
            .await
        };

        timer.record();
        result
    }

    /// Update an invitee. Fields left as None keep their current value.
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        tickets: Option<i32>,
    ) -> Result<InviteeEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_invitee");
        let result = sqlx::query_as::<_, InviteeEntity>(&format!(
            r#"
            UPDATE invitees
            SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                tickets = COALESCE($5, tickets),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INVITEE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(tickets)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set an invitee's RSVP status and stamp the response time.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: InviteeStatus,
        tickets: Option<i32>,
    ) -> Result<InviteeEntity, sqlx::Error> {
        let timer = QueryTimer::new("set_invitee_status");
        let status_db: InviteeStatusDb = status.into();
        let result = sqlx::query_as::<_, InviteeEntity>(&format!(
            r#"
            UPDATE invitees
            SET
                status = $2,
                tickets = COALESCE($3, tickets),
                responded_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {INVITEE_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status_db)
        .bind(tickets)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an invitee.
    pub async fn delete(&self, id: Uuid, couple_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_invitee");
        let result = sqlx::query(
            r#"
            DELETE FROM invitees
            WHERE id = $1 AND couple_id = $2
            "#,
        )
        .bind(id)
        .bind(couple_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Delete a batch of a couple's invitees and return how many went away.
    pub async fn bulk_delete(&self, couple_id: Uuid, ids: &[Uuid]) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_delete_invitees");
        let result = sqlx::query(
            r#"
            DELETE FROM invitees
            WHERE couple_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(couple_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Set the status of a batch of a couple's invitees and return how many
    /// rows changed.
    pub async fn bulk_set_status(
        &self,
        couple_id: Uuid,
        ids: &[Uuid],
        status: InviteeStatus,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("bulk_set_invitee_status");
        let status_db: InviteeStatusDb = status.into();
        let result = sqlx::query(
            r#"
            UPDATE invitees
            SET status = $3, responded_at = NOW(), updated_at = NOW()
            WHERE couple_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(couple_id)
        .bind(ids)
        .bind(status_db)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Total confirmed tickets for a couple.
    pub async fn confirmed_ticket_count(&self, couple_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("confirmed_ticket_count");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(SUM(tickets), 0)
            FROM invitees
            WHERE couple_id = $1 AND status = 'confirmed'
            "#,
        )
        .bind(couple_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: InviteeRepository tests require database connection and are covered by integration tests
}
