use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Order, OrderItem, OrderStats, OrderStatus, PageParams, TimelineEntry},
    error::{AppError, Result},
    repository::OrderRepository,
};

#[derive(FromRow)]
struct OrderRow {
    id: String,
    buyer_id: String,
    seller_id: String,
    delivery_agent_id: Option<String>,
    status: String,
    total_price_cents: i64,
    shipping_address: String,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct OrderItemRow {
    id: String,
    order_id: String,
    plant_id: String,
    quantity: i64,
    unit_price_cents: i64,
}

#[derive(FromRow)]
struct TimelineRow {
    id: String,
    order_id: String,
    status: String,
    note: Option<String>,
    created_at: NaiveDateTime,
}

const ORDER_COLUMNS: &str = "id, buyer_id, seller_id, delivery_agent_id, status, \
                             total_price_cents, shipping_address, notes, created_at, updated_at";

/// Which side of an order a listing or stats query is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderParty {
    Buyer,
    Seller,
}

impl OrderParty {
    fn column(&self) -> &'static str {
        match self {
            OrderParty::Buyer => "buyer_id",
            OrderParty::Seller => "seller_id",
        }
    }
}

pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

fn parse_status(s: &str) -> Result<OrderStatus> {
    OrderStatus::from_str(s).ok_or_else(|| AppError::Database(format!("Invalid order status: {}", s)))
}

/// Renders `?, ?, ?` for an `IN (...)` list of `n` statuses.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl SqliteOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_order(row: OrderRow) -> Result<Order> {
        Ok(Order {
            id: parse_uuid(&row.id)?,
            buyer_id: parse_uuid(&row.buyer_id)?,
            seller_id: parse_uuid(&row.seller_id)?,
            delivery_agent_id: row.delivery_agent_id.as_deref().map(parse_uuid).transpose()?,
            status: parse_status(&row.status)?,
            total_price_cents: row.total_price_cents,
            shipping_address: row.shipping_address,
            notes: row.notes,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_item(row: OrderItemRow) -> Result<OrderItem> {
        Ok(OrderItem {
            id: parse_uuid(&row.id)?,
            order_id: parse_uuid(&row.order_id)?,
            plant_id: parse_uuid(&row.plant_id)?,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        })
    }

    pub async fn find_in(conn: &mut SqliteConnection, id: Uuid) -> Result<Option<Order>> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = ?",
            ORDER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(conn)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    pub async fn items_in(conn: &mut SqliteConnection, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT id, order_id, plant_id, quantity, unit_price_cents FROM order_items WHERE order_id = ?",
        )
        .bind(order_id.to_string())
        .fetch_all(conn)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    pub async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, buyer_id, seller_id, delivery_agent_id, status, total_price_cents,
                shipping_address, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(order.id.to_string())
        .bind(order.buyer_id.to_string())
        .bind(order.seller_id.to_string())
        .bind(order.delivery_agent_id.map(|id| id.to_string()))
        .bind(order.status.as_str())
        .bind(order.total_price_cents)
        .bind(&order.shipping_address)
        .bind(&order.notes)
        .bind(order.created_at.naive_utc())
        .bind(order.updated_at.naive_utc())
        .execute(conn)
        .await?;

        Ok(())
    }

    pub async fn insert_item(conn: &mut SqliteConnection, item: &OrderItem) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO order_items (id, order_id, plant_id, quantity, unit_price_cents)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(item.id.to_string())
        .bind(item.order_id.to_string())
        .bind(item.plant_id.to_string())
        .bind(item.quantity)
        .bind(item.unit_price_cents)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Moves the order to `to` only if it currently sits in one of `from`.
    /// Returns false when the order was not in an accepted state (or does not exist).
    pub async fn transition(
        conn: &mut SqliteConnection,
        order_id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
    ) -> Result<bool> {
        if from.is_empty() {
            return Ok(false);
        }

        let sql = format!(
            "UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status IN ({})",
            placeholders(from.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(to.as_str())
            .bind(Utc::now().naive_utc())
            .bind(order_id.to_string());
        for status in from {
            query = query.bind(status.as_str());
        }

        let result = query.execute(conn).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Binds an agent to an order that has none and forces it to `confirmed`.
    pub async fn attach_agent(
        conn: &mut SqliteConnection,
        order_id: Uuid,
        agent_id: Uuid,
        from: &[OrderStatus],
    ) -> Result<bool> {
        let sql = format!(
            r#"
            UPDATE orders
            SET delivery_agent_id = ?, status = ?, updated_at = ?
            WHERE id = ? AND delivery_agent_id IS NULL AND status IN ({})
            "#,
            placeholders(from.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(agent_id.to_string())
            .bind(OrderStatus::Confirmed.as_str())
            .bind(Utc::now().naive_utc())
            .bind(order_id.to_string());
        for status in from {
            query = query.bind(status.as_str());
        }

        let result = query.execute(conn).await?;
        Ok(result.rows_affected() == 1)
    }

    /// Marks an order delivered if it is held by `agent_id` and in one of `from`.
    pub async fn complete_with_agent(
        conn: &mut SqliteConnection,
        order_id: Uuid,
        agent_id: Uuid,
        from: &[OrderStatus],
    ) -> Result<bool> {
        let sql = format!(
            r#"
            UPDATE orders
            SET status = ?, updated_at = ?
            WHERE id = ? AND delivery_agent_id = ? AND status IN ({})
            "#,
            placeholders(from.len())
        );
        let mut query = sqlx::query(&sql)
            .bind(OrderStatus::Delivered.as_str())
            .bind(Utc::now().naive_utc())
            .bind(order_id.to_string())
            .bind(agent_id.to_string());
        for status in from {
            query = query.bind(status.as_str());
        }

        let result = query.execute(conn).await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn append_timeline(
        conn: &mut SqliteConnection,
        order_id: Uuid,
        status: OrderStatus,
        note: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO delivery_timeline (id, order_id, status, note, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(order_id.to_string())
        .bind(status.as_str())
        .bind(note)
        .bind(Utc::now().naive_utc())
        .execute(conn)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        Self::find_in(&mut conn, id).await
    }

    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let mut conn = self.pool.acquire().await?;
        Self::items_in(&mut conn, order_id).await
    }

    async fn list_for(
        &self,
        party: OrderParty,
        user_id: Uuid,
        page: PageParams,
    ) -> Result<(Vec<Order>, i64)> {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM orders WHERE {} = ?",
            party.column()
        ))
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE {} = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
            ORDER_COLUMNS,
            party.column()
        ))
        .bind(user_id.to_string())
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;
        Ok((orders, total))
    }

    async fn list_by_agent(&self, agent_id: Uuid) -> Result<Vec<Order>> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE delivery_agent_id = ? ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(agent_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_order).collect()
    }

    async fn timeline(&self, order_id: Uuid) -> Result<Vec<TimelineEntry>> {
        // rowid breaks ties between rows written within the same clock tick.
        let rows = sqlx::query_as::<_, TimelineRow>(
            r#"
            SELECT id, order_id, status, note, created_at
            FROM delivery_timeline
            WHERE order_id = ?
            ORDER BY created_at ASC, rowid ASC
            "#,
        )
        .bind(order_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(TimelineEntry {
                    id: parse_uuid(&row.id)?,
                    order_id: parse_uuid(&row.order_id)?,
                    status: parse_status(&row.status)?,
                    note: row.note,
                    timestamp: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
                })
            })
            .collect()
    }

    async fn stats_for(&self, party: OrderParty, user_id: Uuid) -> Result<OrderStats> {
        let (total_orders, pending_orders, completed_orders, cancelled_orders, total_revenue_cents): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(&format!(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN status = 'delivered' THEN total_price_cents ELSE 0 END), 0)
            FROM orders
            WHERE {} = ?
            "#,
            party.column()
        ))
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(OrderStats {
            total_orders,
            pending_orders,
            completed_orders,
            cancelled_orders,
            total_revenue_cents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
