use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        AdminOrderStats, DashboardStats, MonthlyAmount, OrderStatus, PlantStats, RecentOrder,
        RecentPlant, TopSeller, TopSellingPlant, UserStats,
    },
    error::{AppError, Result},
    repository::AnalyticsRepository,
};

#[derive(FromRow)]
struct TopSellingRow {
    id: String,
    name: String,
    total_sold: i64,
}

#[derive(FromRow)]
struct TopSellerRow {
    id: String,
    name: String,
    total_sales: i64,
    total_orders: i64,
    plants_sold: i64,
}

#[derive(FromRow)]
struct RecentOrderRow {
    id: String,
    buyer_name: String,
    seller_name: String,
    total_price_cents: i64,
    status: String,
    created_at: NaiveDateTime,
}

#[derive(FromRow)]
struct RecentPlantRow {
    id: String,
    name: String,
    price_cents: i64,
    seller_name: String,
    verified_by_ai: i32,
    created_at: NaiveDateTime,
}

/// Counters over one seller's catalog and orders.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct SellerTotals {
    pub total_plants: i64,
    pub active_plants: i64,
    pub verified_plants: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub total_revenue_cents: i64,
    /// Confirmed or shipped, not yet delivered.
    pub pending_revenue_cents: i64,
}

/// Orders, delivered revenue and delivered units since a point in time.
#[derive(Debug, Clone, Copy, PartialEq, FromRow)]
pub struct PeriodTotals {
    pub orders_count: i64,
    pub revenue_cents: i64,
    pub plants_sold: i64,
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

fn start_of_today() -> NaiveDateTime {
    Utc::now().date_naive().and_time(NaiveTime::MIN)
}

fn days_ago(days: i64) -> NaiveDateTime {
    (Utc::now() - Duration::days(days)).naive_utc()
}

pub fn start_of_month(today: NaiveDate) -> NaiveDateTime {
    today.with_day(1).unwrap_or(today).and_time(NaiveTime::MIN)
}

/// The twelve `YYYY-MM` keys ending with `today`'s month, oldest first.
pub fn last_twelve_months(today: NaiveDate) -> Vec<(String, NaiveDate)> {
    let mut months = Vec::with_capacity(12);
    let (mut year, mut month) = (today.year(), today.month());
    for _ in 0..12 {
        if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
            months.push((format!("{:04}-{:02}", year, month), first));
        }
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();
    months
}

pub struct SqliteAnalyticsRepository {
    pool: SqlitePool,
}

impl SqliteAnalyticsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str) -> Result<i64> {
        Ok(sqlx::query_scalar(sql).fetch_one(&self.pool).await?)
    }

    async fn delivered_revenue_since(&self, since: NaiveDateTime) -> Result<i64> {
        Ok(sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price_cents), 0) FROM orders WHERE status = 'delivered' AND created_at >= ?",
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?)
    }

    fn top_selling_from_rows(rows: Vec<TopSellingRow>) -> Result<Vec<TopSellingPlant>> {
        rows.into_iter()
            .map(|r| {
                Ok(TopSellingPlant {
                    plant_id: parse_uuid(&r.id)?,
                    name: r.name,
                    total_sold: r.total_sold,
                })
            })
            .collect()
    }
}

#[async_trait]
impl AnalyticsRepository for SqliteAnalyticsRepository {
    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let (
            total_users,
            total_sellers,
            total_plants,
            total_orders,
            total_revenue_cents,
            active_delivery_agents,
            pending_orders,
            verified_plants,
        ): (i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*) FROM users),
                (SELECT COUNT(*) FROM users WHERE role = 'seller'),
                (SELECT COUNT(*) FROM plants WHERE is_active = 1),
                (SELECT COUNT(*) FROM orders),
                (SELECT COALESCE(SUM(total_price_cents), 0) FROM orders WHERE status = 'delivered'),
                (SELECT COUNT(*) FROM delivery_agents WHERE status = 'active'),
                (SELECT COUNT(*) FROM orders WHERE status = 'pending'),
                (SELECT COUNT(*) FROM plants WHERE verified_by_ai = 1)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DashboardStats {
            total_users,
            total_sellers,
            total_plants,
            total_orders,
            total_revenue_cents,
            active_delivery_agents,
            pending_orders,
            verified_plants,
        })
    }

    async fn user_stats(&self) -> Result<UserStats> {
        let (total_users, new_users_today, new_users_this_week, new_users_this_month, verified_users, active_users): (
            i64,
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*),
                COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(CASE WHEN created_at >= ? THEN 1 ELSE 0 END), 0),
                COALESCE(SUM(is_verified), 0),
                COALESCE(SUM(is_active), 0)
            FROM users
            "#,
        )
        .bind(start_of_today())
        .bind(days_ago(7))
        .bind(days_ago(30))
        .fetch_one(&self.pool)
        .await?;

        Ok(UserStats {
            total_users,
            new_users_today,
            new_users_this_week,
            new_users_this_month,
            verified_users,
            active_users,
        })
    }

    async fn plant_stats(&self, top_limit: i64) -> Result<PlantStats> {
        let total_plants = self.count("SELECT COUNT(*) FROM plants WHERE is_active = 1").await?;
        let verified_plants = self
            .count("SELECT COUNT(*) FROM plants WHERE is_active = 1 AND verified_by_ai = 1")
            .await?;

        let categories: Vec<(Option<String>, i64)> = sqlx::query_as(
            "SELECT category, COUNT(*) FROM plants WHERE is_active = 1 GROUP BY category",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut plants_by_category = BTreeMap::new();
        for (category, count) in categories {
            *plants_by_category
                .entry(category.unwrap_or_else(|| "Uncategorized".to_string()))
                .or_insert(0) += count;
        }

        let rows = sqlx::query_as::<_, TopSellingRow>(
            r#"
            SELECT p.id, p.name, SUM(oi.quantity) AS total_sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN plants p ON p.id = oi.plant_id
            WHERE p.is_active = 1 AND o.status != 'cancelled'
            GROUP BY p.id, p.name
            ORDER BY total_sold DESC
            LIMIT ?
            "#,
        )
        .bind(top_limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(PlantStats {
            total_plants,
            verified_plants,
            unverified_plants: total_plants - verified_plants,
            plants_by_category,
            top_selling_plants: Self::top_selling_from_rows(rows)?,
        })
    }

    async fn order_stats(&self) -> Result<AdminOrderStats> {
        let counts: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM orders GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        let counts: HashMap<String, i64> = counts.into_iter().collect();
        let count_of = |status: OrderStatus| counts.get(status.as_str()).copied().unwrap_or(0);

        let total_revenue_cents: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_price_cents), 0) FROM orders WHERE status = 'delivered'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(AdminOrderStats {
            total_orders: counts.values().sum(),
            pending_orders: count_of(OrderStatus::Pending),
            confirmed_orders: count_of(OrderStatus::Confirmed),
            shipped_orders: count_of(OrderStatus::Shipped),
            delivered_orders: count_of(OrderStatus::Delivered),
            cancelled_orders: count_of(OrderStatus::Cancelled),
            total_revenue_cents,
            revenue_today_cents: self.delivered_revenue_since(start_of_today()).await?,
            revenue_this_week_cents: self.delivered_revenue_since(days_ago(7)).await?,
            revenue_this_month_cents: self.delivered_revenue_since(days_ago(30)).await?,
        })
    }

    async fn revenue_by_month(&self, seller_id: Option<Uuid>) -> Result<Vec<MonthlyAmount>> {
        let months = last_twelve_months(Utc::now().date_naive());
        let since = months
            .first()
            .map(|(_, first)| first.and_time(NaiveTime::MIN))
            .unwrap_or_else(start_of_today);

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT strftime('%Y-%m', created_at) AS month, COALESCE(SUM(total_price_cents), 0)
            FROM orders
            WHERE status = 'delivered'
              AND created_at >= ?
              AND (? IS NULL OR seller_id = ?)
            GROUP BY month
            "#,
        )
        .bind(since)
        .bind(seller_id.map(|id| id.to_string()))
        .bind(seller_id.map(|id| id.to_string()))
        .fetch_all(&self.pool)
        .await?;
        let by_month: HashMap<String, i64> = rows.into_iter().collect();

        Ok(months
            .into_iter()
            .map(|(month, _)| MonthlyAmount {
                amount_cents: by_month.get(&month).copied().unwrap_or(0),
                month,
            })
            .collect())
    }

    async fn top_sellers(&self, limit: i64) -> Result<Vec<TopSeller>> {
        let rows = sqlx::query_as::<_, TopSellerRow>(
            r#"
            SELECT
                u.id,
                u.name,
                COALESCE(SUM(o.total_price_cents), 0) AS total_sales,
                COUNT(o.id) AS total_orders,
                COALESCE((
                    SELECT SUM(oi.quantity)
                    FROM order_items oi
                    JOIN orders o2 ON o2.id = oi.order_id
                    WHERE o2.seller_id = u.id AND o2.status = 'delivered'
                ), 0) AS plants_sold
            FROM users u
            JOIN orders o ON o.seller_id = u.id
            WHERE o.status = 'delivered'
            GROUP BY u.id, u.name
            ORDER BY total_sales DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(TopSeller {
                    seller_id: parse_uuid(&r.id)?,
                    seller_name: r.name,
                    total_sales_cents: r.total_sales,
                    total_orders: r.total_orders,
                    plants_sold: r.plants_sold,
                })
            })
            .collect()
    }

    async fn recent_orders(&self, seller_id: Option<Uuid>, limit: i64) -> Result<Vec<RecentOrder>> {
        let rows = sqlx::query_as::<_, RecentOrderRow>(
            r#"
            SELECT o.id, b.name AS buyer_name, s.name AS seller_name,
                   o.total_price_cents, o.status, o.created_at
            FROM orders o
            JOIN users b ON b.id = o.buyer_id
            JOIN users s ON s.id = o.seller_id
            WHERE (? IS NULL OR o.seller_id = ?)
            ORDER BY o.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(seller_id.map(|id| id.to_string()))
        .bind(seller_id.map(|id| id.to_string()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(RecentOrder {
                    order_id: parse_uuid(&r.id)?,
                    buyer_name: r.buyer_name,
                    seller_name: r.seller_name,
                    total_price_cents: r.total_price_cents,
                    status: OrderStatus::from_str(&r.status).ok_or_else(|| {
                        AppError::Database(format!("Invalid order status: {}", r.status))
                    })?,
                    created_at: DateTime::from_naive_utc_and_offset(r.created_at, Utc),
                })
            })
            .collect()
    }

    async fn recent_plants(&self, limit: i64) -> Result<Vec<RecentPlant>> {
        let rows = sqlx::query_as::<_, RecentPlantRow>(
            r#"
            SELECT p.id, p.name, p.price_cents, u.name AS seller_name,
                   p.verified_by_ai, p.created_at
            FROM plants p
            JOIN users u ON u.id = p.seller_id
            WHERE p.is_active = 1
            ORDER BY p.created_at DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                Ok(RecentPlant {
                    plant_id: parse_uuid(&r.id)?,
                    name: r.name,
                    price_cents: r.price_cents,
                    seller_name: r.seller_name,
                    verified_by_ai: r.verified_by_ai != 0,
                    created_at: DateTime::from_naive_utc_and_offset(r.created_at, Utc),
                })
            })
            .collect()
    }

    async fn seller_totals(&self, seller_id: Uuid) -> Result<SellerTotals> {
        let totals = sqlx::query_as::<_, SellerTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM plants WHERE seller_id = ?1) AS total_plants,
                (SELECT COUNT(*) FROM plants WHERE seller_id = ?1 AND is_active = 1) AS active_plants,
                (SELECT COUNT(*) FROM plants WHERE seller_id = ?1 AND verified_by_ai = 1) AS verified_plants,
                (SELECT COUNT(*) FROM orders WHERE seller_id = ?1) AS total_orders,
                (SELECT COUNT(*) FROM orders WHERE seller_id = ?1 AND status = 'pending') AS pending_orders,
                (SELECT COUNT(*) FROM orders WHERE seller_id = ?1 AND status = 'delivered') AS completed_orders,
                (SELECT COALESCE(SUM(total_price_cents), 0) FROM orders
                    WHERE seller_id = ?1 AND status = 'delivered') AS total_revenue_cents,
                (SELECT COALESCE(SUM(total_price_cents), 0) FROM orders
                    WHERE seller_id = ?1 AND status IN ('confirmed', 'shipped')) AS pending_revenue_cents
            "#,
        )
        .bind(seller_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    async fn seller_top_selling(&self, seller_id: Uuid, limit: i64) -> Result<Vec<TopSellingPlant>> {
        let rows = sqlx::query_as::<_, TopSellingRow>(
            r#"
            SELECT p.id, p.name, SUM(oi.quantity) AS total_sold
            FROM order_items oi
            JOIN orders o ON o.id = oi.order_id
            JOIN plants p ON p.id = oi.plant_id
            WHERE p.seller_id = ? AND o.status != 'cancelled'
            GROUP BY p.id, p.name
            ORDER BY total_sold DESC
            LIMIT ?
            "#,
        )
        .bind(seller_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Self::top_selling_from_rows(rows)
    }

    async fn seller_period(&self, seller_id: Uuid, since: NaiveDateTime) -> Result<PeriodTotals> {
        let totals = sqlx::query_as::<_, PeriodTotals>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM orders WHERE seller_id = ?1 AND created_at >= ?2) AS orders_count,
                (SELECT COALESCE(SUM(total_price_cents), 0) FROM orders
                    WHERE seller_id = ?1 AND status = 'delivered' AND created_at >= ?2) AS revenue_cents,
                (SELECT COALESCE(SUM(oi.quantity), 0) FROM order_items oi
                    JOIN orders o ON o.id = oi.order_id
                    WHERE o.seller_id = ?1 AND o.status = 'delivered' AND o.created_at >= ?2) AS plants_sold
            "#,
        )
        .bind(seller_id.to_string())
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_twelve_months_crosses_year_boundary() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let months: Vec<String> = last_twelve_months(today).into_iter().map(|(m, _)| m).collect();
        assert_eq!(months.len(), 12);
        assert_eq!(months.first().map(String::as_str), Some("2024-04"));
        assert_eq!(months.last().map(String::as_str), Some("2025-03"));
    }

    #[test]
    fn test_last_twelve_months_in_december() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let months = last_twelve_months(today);
        assert_eq!(months[0].0, "2024-01");
        assert_eq!(months[11].0, "2024-12");
        assert_eq!(months[0].1, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }
}
