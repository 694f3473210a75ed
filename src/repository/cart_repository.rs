use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Cart, CartItem},
    error::{AppError, Result},
    repository::CartRepository,
};

#[derive(FromRow)]
struct CartRow {
    id: String,
    user_id: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CartItemRow {
    id: String,
    cart_id: String,
    plant_id: String,
    quantity: i64,
    unit_price_cents: i64,
    created_at: NaiveDateTime,
}

pub struct SqliteCartRepository {
    pool: SqlitePool,
}

impl SqliteCartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_item(row: CartItemRow) -> Result<CartItem> {
        Ok(CartItem {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            cart_id: Uuid::parse_str(&row.cart_id).map_err(|e| AppError::Database(e.to_string()))?,
            plant_id: Uuid::parse_str(&row.plant_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
        })
    }

    async fn load_items(&self, cart_id: &str) -> Result<Vec<CartItem>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT id, cart_id, plant_id, quantity, unit_price_cents, created_at
            FROM cart_items
            WHERE cart_id = ?
            ORDER BY created_at ASC
            "#,
        )
        .bind(cart_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn touch(&self, cart_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE carts SET updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(cart_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Removes exactly the lines a checkout consumed; lines added concurrently survive.
    pub async fn delete_items_in(conn: &mut SqliteConnection, item_ids: &[Uuid]) -> Result<()> {
        for item_id in item_ids {
            sqlx::query("DELETE FROM cart_items WHERE id = ?")
                .bind(item_id.to_string())
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl CartRepository for SqliteCartRepository {
    async fn find_or_create(&self, user_id: Uuid) -> Result<Cart> {
        let now = Utc::now().naive_utc();

        // The UNIQUE(user_id) constraint makes concurrent first reads converge on one cart.
        sqlx::query(
            r#"
            INSERT INTO carts (id, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(user_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, created_at, updated_at FROM carts WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let items = self.load_items(&row.id).await?;

        Ok(Cart {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id)
                .map_err(|e| AppError::Database(e.to_string()))?,
            items,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    async fn add_item(
        &self,
        cart_id: Uuid,
        plant_id: Uuid,
        quantity: i64,
        unit_price_cents: i64,
    ) -> Result<()> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO cart_items (id, cart_id, plant_id, quantity, unit_price_cents, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(cart_id.to_string())
        .bind(plant_id.to_string())
        .bind(quantity)
        .bind(unit_price_cents)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.touch(cart_id).await
    }

    async fn set_item_quantity(&self, cart_id: Uuid, item_id: Uuid, quantity: i64) -> Result<()> {
        let result = sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ? AND cart_id = ?")
            .bind(quantity)
            .bind(item_id.to_string())
            .bind(cart_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        self.touch(cart_id).await
    }

    async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND cart_id = ?")
            .bind(item_id.to_string())
            .bind(cart_id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        self.touch(cart_id).await
    }

    async fn clear(&self, cart_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = ?")
            .bind(cart_id.to_string())
            .execute(&self.pool)
            .await?;

        self.touch(cart_id).await
    }
}
