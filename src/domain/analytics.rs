use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::OrderStatus;

// Revenue figures count delivered orders only.

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardStats {
    pub total_users: i64,
    pub total_sellers: i64,
    pub total_plants: i64,
    pub total_orders: i64,
    pub total_revenue_cents: i64,
    pub active_delivery_agents: i64,
    pub pending_orders: i64,
    pub verified_plants: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserStats {
    pub total_users: i64,
    pub new_users_today: i64,
    pub new_users_this_week: i64,
    pub new_users_this_month: i64,
    pub verified_users: i64,
    pub active_users: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopSellingPlant {
    pub plant_id: Uuid,
    pub name: String,
    pub total_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantStats {
    pub total_plants: i64,
    pub verified_plants: i64,
    pub unverified_plants: i64,
    pub plants_by_category: BTreeMap<String, i64>,
    pub top_selling_plants: Vec<TopSellingPlant>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminOrderStats {
    pub total_orders: i64,
    pub pending_orders: i64,
    pub confirmed_orders: i64,
    pub shipped_orders: i64,
    pub delivered_orders: i64,
    pub cancelled_orders: i64,
    pub total_revenue_cents: i64,
    pub revenue_today_cents: i64,
    pub revenue_this_week_cents: i64,
    pub revenue_this_month_cents: i64,
}

/// One calendar month bucket, `month` formatted as `YYYY-MM`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthlyAmount {
    pub month: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevenueStats {
    pub total_revenue_cents: i64,
    /// Twelve calendar months, oldest first, current month last.
    pub revenue_by_month: Vec<MonthlyAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopSeller {
    pub seller_id: Uuid,
    pub seller_name: String,
    pub total_sales_cents: i64,
    pub total_orders: i64,
    pub plants_sold: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentOrder {
    pub order_id: Uuid,
    pub buyer_name: String,
    pub seller_name: String,
    pub total_price_cents: i64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecentPlant {
    pub plant_id: Uuid,
    pub name: String,
    pub price_cents: i64,
    pub seller_name: String,
    pub verified_by_ai: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub stats: DashboardStats,
    pub user_stats: UserStats,
    pub plant_stats: PlantStats,
    pub order_stats: AdminOrderStats,
    pub revenue_stats: RevenueStats,
    pub top_sellers: Vec<TopSeller>,
    pub recent_orders: Vec<RecentOrder>,
    pub recent_plants: Vec<RecentPlant>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemHealth {
    pub database_status: String,
    pub vision_status: String,
    pub storage_status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerDashboard {
    pub total_plants: i64,
    pub active_plants: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub completed_orders: i64,
    pub total_revenue_cents: i64,
    pub monthly_revenue_cents: i64,
    pub top_selling_plants: Vec<TopSellingPlant>,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerStats {
    pub total_plants: i64,
    pub verified_plants: i64,
    pub total_orders: i64,
    pub total_revenue_cents: i64,
    pub average_order_value_cents: i64,
    /// Delivered orders as a percentage of all orders.
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerEarnings {
    pub total_earnings_cents: i64,
    /// Confirmed and shipped orders not yet delivered.
    pub pending_earnings_cents: i64,
    pub earnings_this_month_cents: i64,
    pub earnings_by_month: Vec<MonthlyAmount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SellerPerformance {
    pub period_days: i64,
    pub orders_count: i64,
    pub revenue_cents: i64,
    pub plants_sold: i64,
    pub average_order_value_cents: i64,
}
