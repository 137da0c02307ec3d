//! Gift repository for database operations.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::GiftEntity;
use crate::metrics::QueryTimer;

const GIFT_COLUMNS: &str = "id, wedding_list_id, name, description, price, currency, image_url, \
     category, quantity, purchased_quantity, created_at, updated_at";

/// Repository for gift-related database operations.
#[derive(Clone)]
pub struct GiftRepository {
    pool: PgPool,
}

impl GiftRepository {
    /// Creates a new GiftRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a gift on a wedding list.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        wedding_list_id: Uuid,
        name: &str,
        description: Option<&str>,
        price: Decimal,
        currency: &str,
        image_url: Option<&str>,
        category: Option<&str>,
        quantity: i32,
    ) -> Result<GiftEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_gift");
        let result = sqlx::query_as::<_, GiftEntity>(&format!(
            r#"
            INSERT INTO gifts (wedding_list_id, name, description, price, currency, image_url, category, quantity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {GIFT_COLUMNS}
            "#,
        ))
        .bind(wedding_list_id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(currency)
        .bind(image_url)
        .bind(category)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a gift by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<GiftEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_gift_by_id");
        let result = sqlx::query_as::<_, GiftEntity>(&format!(
            r#"
            SELECT {GIFT_COLUMNS}
            FROM gifts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List gifts on a wedding list, newest first.
    pub async fn list_for_wedding_list(
        &self,
        wedding_list_id: Uuid,
    ) -> Result<Vec<GiftEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_gifts_for_wedding_list");
        let result = sqlx::query_as::<_, GiftEntity>(&format!(
            r#"
            SELECT {GIFT_COLUMNS}
            FROM gifts
            WHERE wedding_list_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(wedding_list_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a gift. Fields left as None keep their current value.
    #[allow(clippy::too_many_arguments)]
    pub async fn update(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        price: Option<Decimal>,
        image_url: Option<&str>,
        category: Option<&str>,
        quantity: Option<i32>,
    ) -> Result<GiftEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_gift");
        let result = sqlx::query_as::<_, GiftEntity>(&format!(
            r#"
            UPDATE gifts
            SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                image_url = COALESCE($5, image_url),
                category = COALESCE($6, category),
                quantity = COALESCE($7, quantity),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {GIFT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(image_url)
        .bind(category)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a gift.
    pub async fn delete(&self, id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_gift");
        let result = sqlx::query(
            r#"
            DELETE FROM gifts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }
}
