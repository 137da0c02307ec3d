//! Cart repository for database operations.

use domain::models::PaymentType;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{CartEntity, CartItemEntity, CartItemWithGiftEntity, PaymentProviderDb};
use crate::metrics::QueryTimer;

const CART_COLUMNS: &str = "id, session_id, total_amount, currency, payment_type, payment_id, \
     is_paid, paid_at, invitee_name, invitee_email, invitee_phone, message, created_at, updated_at";

/// Repository for cart and cart item database operations.
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Creates a new CartRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find the cart for a session, creating an empty one if none exists.
    pub async fn get_or_create(&self, session_id: &str) -> Result<CartEntity, sqlx::Error> {
        let timer = QueryTimer::new("get_or_create_cart");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            INSERT INTO carts (session_id)
            VALUES ($1)
            ON CONFLICT (session_id) DO UPDATE SET updated_at = NOW()
            RETURNING {CART_COLUMNS}
            "#,
        ))
        .bind(session_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a cart by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<CartEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_cart_by_id");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            SELECT {CART_COLUMNS}
            FROM carts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the cart for a session without creating one.
    pub async fn find_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<CartEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_cart_by_session");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            SELECT {CART_COLUMNS}
            FROM carts
            WHERE session_id = $1
            "#,
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a cart by its provider payment ID.
    pub async fn find_by_payment_id(
        &self,
        payment_id: &str,
    ) -> Result<Option<CartEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_cart_by_payment_id");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            SELECT {CART_COLUMNS}
            FROM carts
            WHERE payment_id = $1
            "#,
        ))
        .bind(payment_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Add a gift to a cart, bumping quantity when the gift is already there.
    ///
    /// The gift price is snapshotted into the item row at insert time so that
    /// later price edits do not change an open cart.
    pub async fn add_item(
        &self,
        cart_id: Uuid,
        gift_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("add_cart_item");
        let result = sqlx::query_as::<_, CartItemEntity>(
            r#"
            INSERT INTO cart_items (cart_id, gift_id, quantity, price)
            SELECT $1, $2, $3, g.price
            FROM gifts g
            WHERE g.id = $2
            ON CONFLICT (cart_id, gift_id)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity
            RETURNING id, cart_id, gift_id, quantity, price, created_at
            "#,
        )
        .bind(cart_id)
        .bind(gift_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Set the quantity of a cart item.
    pub async fn update_item_quantity(
        &self,
        cart_id: Uuid,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_cart_item_quantity");
        let result = sqlx::query_as::<_, CartItemEntity>(
            r#"
            UPDATE cart_items
            SET quantity = $3
            WHERE id = $2 AND cart_id = $1
            RETURNING id, cart_id, gift_id, quantity, price, created_at
            "#,
        )
        .bind(cart_id)
        .bind(item_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Remove an item from a cart.
    pub async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("remove_cart_item");
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE id = $2 AND cart_id = $1
            "#,
        )
        .bind(cart_id)
        .bind(item_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Remove every item from a cart.
    pub async fn clear_items(&self, cart_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("clear_cart_items");
        let result = sqlx::query(
            r#"
            DELETE FROM cart_items
            WHERE cart_id = $1
            "#,
        )
        .bind(cart_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// List a cart's items joined with their gifts.
    pub async fn list_items_with_gifts(
        &self,
        cart_id: Uuid,
    ) -> Result<Vec<CartItemWithGiftEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_cart_items_with_gifts");
        let result = sqlx::query_as::<_, CartItemWithGiftEntity>(
            r#"
            SELECT
                ci.id, ci.cart_id, ci.gift_id, ci.quantity, ci.price,
                g.name as gift_name, g.price as gift_price, g.currency as gift_currency
            FROM cart_items ci
            JOIN gifts g ON ci.gift_id = g.id
            WHERE ci.cart_id = $1
            ORDER BY ci.created_at ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Count items in a cart.
    pub async fn count_items(&self, cart_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_cart_items");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM cart_items
            WHERE cart_id = $1
            "#,
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Compute a cart's total in the database.
    ///
    /// Each line uses the snapshot price when present and the live gift price
    /// otherwise. An empty cart totals zero.
    pub async fn compute_total(&self, cart_id: Uuid) -> Result<Decimal, sqlx::Error> {
        let timer = QueryTimer::new("compute_cart_total");
        let result = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(COALESCE(ci.price, g.price) * ci.quantity), 0)
            FROM cart_items ci
            JOIN gifts g ON ci.gift_id = g.id
            WHERE ci.cart_id = $1
            "#,
        )
        .bind(cart_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update the invitee contact details on a cart.
    pub async fn update_details(
        &self,
        cart_id: Uuid,
        invitee_name: &str,
        invitee_email: &str,
        invitee_phone: Option<&str>,
        message: Option<&str>,
    ) -> Result<CartEntity, sqlx::Error> {
        let timer = QueryTimer::new("update_cart_details");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            UPDATE carts
            SET
                invitee_name = $2,
                invitee_email = $3,
                invitee_phone = $4,
                message = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CART_COLUMNS}
            "#,
        ))
        .bind(cart_id)
        .bind(invitee_name)
        .bind(invitee_email)
        .bind(invitee_phone)
        .bind(message)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Attach a provider payment to a cart and freeze its total.
    pub async fn set_payment(
        &self,
        cart_id: Uuid,
        payment_type: PaymentType,
        payment_id: &str,
        total_amount: Decimal,
        currency: &str,
    ) -> Result<CartEntity, sqlx::Error> {
        let timer = QueryTimer::new("set_cart_payment");
        let provider: PaymentProviderDb = payment_type.into();
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            UPDATE carts
            SET
                payment_type = $2,
                payment_id = $3,
                total_amount = $4,
                currency = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {CART_COLUMNS}
            "#,
        ))
        .bind(cart_id)
        .bind(provider)
        .bind(payment_id)
        .bind(total_amount)
        .bind(currency)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Detach an abandoned provider payment from a cart.
    ///
    /// Paid carts are excluded so a cancel arriving after a capture cannot
    /// erase the paid payment reference.
    pub async fn clear_payment(&self, cart_id: Uuid) -> Result<Option<CartEntity>, sqlx::Error> {
        let timer = QueryTimer::new("clear_cart_payment");
        let result = sqlx::query_as::<_, CartEntity>(&format!(
            r#"
            UPDATE carts
            SET
                payment_type = NULL,
                payment_id = NULL,
                updated_at = NOW()
            WHERE id = $1 AND is_paid = false
            RETURNING {CART_COLUMNS}
            "#,
        ))
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }
}
