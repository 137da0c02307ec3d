//! Gift purchase repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{GiftEntity, GiftPurchaseEntity, PurchaseStatusDb};
use crate::metrics::QueryTimer;

const PURCHASE_COLUMNS: &str = "id, gift_id, user_id, message, status, created_at";

/// Outcome of a purchase attempt against a gift's remaining quantity.
#[derive(Debug)]
pub enum PurchaseAttempt {
    /// The purchase was recorded and the gift counter advanced.
    Recorded {
        purchase: GiftPurchaseEntity,
        gift: GiftEntity,
    },
    /// Every unit of the gift is already purchased.
    SoldOut,
}

/// Repository for gift purchase database operations.
#[derive(Clone)]
pub struct GiftPurchaseRepository {
    pool: PgPool,
}

impl GiftPurchaseRepository {
    /// Creates a new GiftPurchaseRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a purchase and advance the gift's purchased counter atomically.
    ///
    /// The counter update is guarded by `purchased_quantity < quantity` in the
    /// WHERE clause, so two concurrent purchases of the last unit cannot both
    /// succeed. When the guard rejects the update no purchase row is written.
    pub async fn record_purchase(
        &self,
        gift_id: Uuid,
        user_id: Uuid,
        message: Option<&str>,
    ) -> Result<PurchaseAttempt, sqlx::Error> {
        let timer = QueryTimer::new("record_gift_purchase");

        let mut tx = self.pool.begin().await?;

        let gift = sqlx::query_as::<_, GiftEntity>(
            r#"
            UPDATE gifts
            SET purchased_quantity = purchased_quantity + 1, updated_at = NOW()
            WHERE id = $1 AND purchased_quantity < quantity
            RETURNING id, wedding_list_id, name, description, price, currency, image_url,
                      category, quantity, purchased_quantity, created_at, updated_at
            "#,
        )
        .bind(gift_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(gift) = gift else {
            tx.rollback().await?;
            timer.record();
            return Ok(PurchaseAttempt::SoldOut);
        };

        let purchase = sqlx::query_as::<_, GiftPurchaseEntity>(&format!(
            r#"
            INSERT INTO gift_purchases (gift_id, user_id, message)
            VALUES ($1, $2, $3)
            RETURNING {PURCHASE_COLUMNS}
            "#,
        ))
        .bind(gift_id)
        .bind(user_id)
        .bind(message)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(PurchaseAttempt::Recorded { purchase, gift })
    }

    /// Move a purchase from pending to confirmed.
    pub async fn confirm(&self, purchase_id: Uuid) -> Result<GiftPurchaseEntity, sqlx::Error> {
        let timer = QueryTimer::new("confirm_gift_purchase");
        let result = sqlx::query_as::<_, GiftPurchaseEntity>(&format!(
            r#"
            UPDATE gift_purchases
            SET status = $2
            WHERE id = $1
            RETURNING {PURCHASE_COLUMNS}
            "#,
        ))
        .bind(purchase_id)
        .bind(PurchaseStatusDb::Confirmed)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List purchases of a gift, newest first.
    pub async fn list_for_gift(
        &self,
        gift_id: Uuid,
    ) -> Result<Vec<GiftPurchaseEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_purchases_for_gift");
        let result = sqlx::query_as::<_, GiftPurchaseEntity>(&format!(
            r#"
            SELECT {PURCHASE_COLUMNS}
            FROM gift_purchases
            WHERE gift_id = $1
            ORDER BY created_at DESC
            "#,
        ))
        .bind(gift_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: GiftPurchaseRepository tests require database connection and are covered by integration tests
}
