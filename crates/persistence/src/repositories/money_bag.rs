//! MoneyBag repository for the payment ledger.

use domain::models::PaymentType;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{MoneyBagEntity, PaymentProviderDb};
use crate::metrics::QueryTimer;

const BAG_COLUMNS: &str = "id, cart_id, provider, payment_id, amount, currency, fee, \
     payer_name, payer_email, raw_response, created_at";

/// Repository for money bag (captured payment) database operations.
#[derive(Clone)]
pub struct MoneyBagRepository {
    pool: PgPool,
}

impl MoneyBagRepository {
    /// Creates a new MoneyBagRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a capture: insert the ledger row and mark the cart paid in one
    /// transaction.
    ///
    /// The cart update is guarded by `is_paid = false`. When another request
    /// already captured the same cart the guard rejects the update, the
    /// transaction rolls back and the existing ledger row is returned instead,
    /// so a payment can never be recorded twice.
    #[allow(clippy::too_many_arguments)]
    pub async fn record_capture(
        &self,
        cart_id: Uuid,
        provider: PaymentType,
        payment_id: &str,
        amount: Decimal,
        currency: &str,
        fee: Option<Decimal>,
        payer_name: Option<&str>,
        payer_email: Option<&str>,
        raw_response: serde_json::Value,
    ) -> Result<CaptureRecord, sqlx::Error> {
        let timer = QueryTimer::new("record_payment_capture");
        let provider_db: PaymentProviderDb = provider.into();

        let mut tx = self.pool.begin().await?;

        let paid_rows = sqlx::query(
            r#"
            UPDATE carts
            SET is_paid = true, paid_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND is_paid = false
            "#,
        )
        .bind(cart_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if paid_rows == 0 {
            tx.rollback().await?;
            timer.record();
            let existing = self.find_latest_for_cart(cart_id).await?;
            return match existing {
                Some(bag) => Ok(CaptureRecord::AlreadyCaptured(bag)),
                // Paid cart without a ledger row means the data is corrupt.
                None => Err(sqlx::Error::RowNotFound),
            };
        }

        let bag = sqlx::query_as::<_, MoneyBagEntity>(&format!(
            r#"
            INSERT INTO money_bags (cart_id, provider, payment_id, amount, currency, fee, payer_name, payer_email, raw_response)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {BAG_COLUMNS}
            "#,
        ))
        .bind(cart_id)
        .bind(provider_db)
        .bind(payment_id)
        .bind(amount)
        .bind(currency)
        .bind(fee)
        .bind(payer_name)
        .bind(payer_email)
        .bind(raw_response)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        timer.record();
        Ok(CaptureRecord::Captured(bag))
    }

    /// Find a money bag by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<MoneyBagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_money_bag_by_id");
        let result = sqlx::query_as::<_, MoneyBagEntity>(&format!(
            r#"
            SELECT {BAG_COLUMNS}
            FROM money_bags
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Latest ledger row for a cart, if any.
    pub async fn find_latest_for_cart(
        &self,
        cart_id: Uuid,
    ) -> Result<Option<MoneyBagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_money_bag_for_cart");
        let result = sqlx::query_as::<_, MoneyBagEntity>(&format!(
            r#"
            SELECT {BAG_COLUMNS}
            FROM money_bags
            WHERE cart_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        ))
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// List the whole ledger, newest first.
    pub async fn list_all(&self, limit: i64, offset: i64) -> Result<Vec<MoneyBagEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_money_bags");
        let result = sqlx::query_as::<_, MoneyBagEntity>(&format!(
            r#"
            SELECT {BAG_COLUMNS}
            FROM money_bags
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count ledger rows.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_money_bags");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM money_bags
            "#,
        )
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

/// Result of [`MoneyBagRepository::record_capture`].
#[derive(Debug)]
pub enum CaptureRecord {
    /// First capture for this cart; a new ledger row was written.
    Captured(MoneyBagEntity),
    /// The cart was already paid; the existing ledger row is returned.
    AlreadyCaptured(MoneyBagEntity),
}
