//! Wedding list repository for database operations.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::WeddingListEntity;
use crate::metrics::QueryTimer;

const LIST_COLUMNS: &str =
    "id, couple_id, title, slug, description, event_date, created_at, updated_at";

/// Repository for wedding list database operations.
#[derive(Clone)]
pub struct WeddingListRepository {
    pool: PgPool,
}

impl WeddingListRepository {
    /// Creates a new WeddingListRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a wedding list for a couple.
    pub async fn create(
        &self,
        couple_id: Uuid,
        title: &str,
        slug: &str,
        description: Option<&str>,
        event_date: Option<NaiveDate>,
    ) -> Result<WeddingListEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_wedding_list");
        let result = sqlx::query_as::<_, WeddingListEntity>(&format!(
            r#"
            INSERT INTO wedding_lists (couple_id, title, slug, description, event_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {LIST_COLUMNS}
            "#,
        ))
        .bind(couple_id)
        .bind(title)
        .bind(slug)
        .bind(description)
        .bind(event_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a wedding list by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<WeddingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_wedding_list_by_id");
        let result = sqlx::query_as::<_, WeddingListEntity>(&format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM wedding_lists
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a wedding list by its public slug.
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<WeddingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_wedding_list_by_slug");
        let result = sqlx::query_as::<_, WeddingListEntity>(&format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM wedding_lists
            WHERE slug = $1
            "#,
        ))
        .bind(slug)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List all wedding lists owned by a couple.
    pub async fn list_for_couple(
        &self,
        couple_id: Uuid,
    ) -> Result<Vec<WeddingListEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_wedding_lists_for_couple");
        let result = sqlx::query_as::<_, WeddingListEntity>(&format!(
            r#"
            SELECT {LIST_COLUMNS}
            FROM wedding_lists
            WHERE couple_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(couple_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a wedding list. Fields left as None keep their current value.
    pub async fn update(
        &self,
        id: Uuid,
        title: Option<&str>,
        description: Option<&str>,
        event_date: Option<NaiveDate>,
    ) -> Result<WeddingListEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_wedding_list");
        let result = sqlx::query_as::<_, WeddingListEntity>(&format!(
            r#"
            UPDATE wedding_lists
            SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                event_date = COALESCE($4, event_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {LIST_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(event_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a wedding list and its gifts.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_wedding_list");
        let result = sqlx::query(
            r#"
            DELETE FROM wedding_lists
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Check if slug exists.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("check_wedding_list_slug_exists");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM wedding_lists WHERE slug = $1)
            "#,
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Generate unique slug by appending numbers if needed.
    pub async fn generate_unique_slug(&self, base_slug: &str) -> Result<String, sqlx::Error> {
        let mut slug = base_slug.to_string();
        let mut counter = 1;

        while self.slug_exists(&slug).await? {
            slug = format!("{}-{}", base_slug, counter);
            counter += 1;
            if counter > 100 {
                // Safety limit
                return Err(sqlx::Error::Protocol(
                    "Could not generate unique slug".to_string(),
                ));
            }
        }

        Ok(slug)
    }
}
