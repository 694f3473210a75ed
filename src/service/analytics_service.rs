use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::{
    domain::*,
    error::{AppError, Result},
    integrations::Collaborators,
    repository::{analytics_repository::start_of_month, AnalyticsRepository, DeliveryAgentRepository},
};

const TOP_LIMIT: i64 = 10;
const RECENT_LIMIT: i64 = 10;
const MAX_PERFORMANCE_DAYS: i64 = 365;

/// Integer average; zero when there is nothing to divide by.
fn average(total_cents: i64, count: i64) -> i64 {
    if count > 0 {
        total_cents / count
    } else {
        0
    }
}

fn percentage(part: i64, whole: i64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64 * 100.0
    } else {
        0.0
    }
}

/// Read-only dashboards for admins and sellers.
pub struct AnalyticsService {
    repo: Arc<dyn AnalyticsRepository>,
    agent_repo: Arc<dyn DeliveryAgentRepository>,
    collaborators: Collaborators,
}

impl AnalyticsService {
    pub fn new(
        repo: Arc<dyn AnalyticsRepository>,
        agent_repo: Arc<dyn DeliveryAgentRepository>,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            repo,
            agent_repo,
            collaborators,
        }
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        self.repo.dashboard_stats().await
    }

    pub async fn user_stats(&self) -> Result<UserStats> {
        self.repo.user_stats().await
    }

    pub async fn plant_stats(&self) -> Result<PlantStats> {
        self.repo.plant_stats(TOP_LIMIT).await
    }

    pub async fn order_stats(&self) -> Result<AdminOrderStats> {
        self.repo.order_stats().await
    }

    pub async fn revenue_stats(&self) -> Result<RevenueStats> {
        let revenue_by_month = self.repo.revenue_by_month(None).await?;
        let stats = self.repo.dashboard_stats().await?;
        Ok(RevenueStats {
            total_revenue_cents: stats.total_revenue_cents,
            revenue_by_month,
        })
    }

    pub async fn top_sellers(&self, limit: Option<i64>) -> Result<Vec<TopSeller>> {
        self.repo.top_sellers(limit.unwrap_or(TOP_LIMIT).clamp(1, 100)).await
    }

    pub async fn recent_orders(&self, limit: Option<i64>) -> Result<Vec<RecentOrder>> {
        self.repo
            .recent_orders(None, limit.unwrap_or(RECENT_LIMIT).clamp(1, 100))
            .await
    }

    pub async fn recent_plants(&self, limit: Option<i64>) -> Result<Vec<RecentPlant>> {
        self.repo
            .recent_plants(limit.unwrap_or(RECENT_LIMIT).clamp(1, 100))
            .await
    }

    pub async fn delivery_stats(&self) -> Result<DeliveryStats> {
        self.agent_repo.stats().await
    }

    pub async fn admin_dashboard(&self) -> Result<AdminDashboard> {
        Ok(AdminDashboard {
            stats: self.dashboard_stats().await?,
            user_stats: self.user_stats().await?,
            plant_stats: self.plant_stats().await?,
            order_stats: self.order_stats().await?,
            revenue_stats: self.revenue_stats().await?,
            top_sellers: self.top_sellers(None).await?,
            recent_orders: self.recent_orders(None).await?,
            recent_plants: self.recent_plants(None).await?,
        })
    }

    pub async fn system_health(&self) -> SystemHealth {
        let database_status = match self.repo.ping().await {
            Ok(()) => "healthy".to_string(),
            Err(e) => {
                warn!("Database health check failed: {:?}", e);
                "unhealthy".to_string()
            }
        };

        let mut storage_status = "unknown".to_string();
        let mut vision_status = "unknown".to_string();
        for (name, status) in self.collaborators.health_check_all().await {
            if name == self.collaborators.classifier.name() {
                vision_status = status.to_string();
            } else {
                storage_status = status.to_string();
            }
        }

        SystemHealth {
            database_status,
            vision_status,
            storage_status,
        }
    }

    pub async fn seller_dashboard(&self, seller_id: Uuid) -> Result<SellerDashboard> {
        let totals = self.repo.seller_totals(seller_id).await?;
        let month = self
            .repo
            .seller_period(seller_id, start_of_month(Utc::now().date_naive()))
            .await?;

        Ok(SellerDashboard {
            total_plants: totals.total_plants,
            active_plants: totals.active_plants,
            total_orders: totals.total_orders,
            pending_orders: totals.pending_orders,
            completed_orders: totals.completed_orders,
            total_revenue_cents: totals.total_revenue_cents,
            monthly_revenue_cents: month.revenue_cents,
            top_selling_plants: self.repo.seller_top_selling(seller_id, 5).await?,
            recent_orders: self.repo.recent_orders(Some(seller_id), 5).await?,
        })
    }

    pub async fn seller_stats(&self, seller_id: Uuid) -> Result<SellerStats> {
        let totals = self.repo.seller_totals(seller_id).await?;
        Ok(SellerStats {
            total_plants: totals.total_plants,
            verified_plants: totals.verified_plants,
            total_orders: totals.total_orders,
            total_revenue_cents: totals.total_revenue_cents,
            average_order_value_cents: average(totals.total_revenue_cents, totals.completed_orders),
            conversion_rate: percentage(totals.completed_orders, totals.total_orders),
        })
    }

    pub async fn seller_earnings(&self, seller_id: Uuid) -> Result<SellerEarnings> {
        let totals = self.repo.seller_totals(seller_id).await?;
        let month = self
            .repo
            .seller_period(seller_id, start_of_month(Utc::now().date_naive()))
            .await?;

        Ok(SellerEarnings {
            total_earnings_cents: totals.total_revenue_cents,
            pending_earnings_cents: totals.pending_revenue_cents,
            earnings_this_month_cents: month.revenue_cents,
            earnings_by_month: self.repo.revenue_by_month(Some(seller_id)).await?,
        })
    }

    pub async fn seller_performance(&self, seller_id: Uuid, days: Option<i64>) -> Result<SellerPerformance> {
        let days = days.unwrap_or(30);
        if !(1..=MAX_PERFORMANCE_DAYS).contains(&days) {
            return Err(AppError::Validation(format!(
                "days: must be between 1 and {}",
                MAX_PERFORMANCE_DAYS
            )));
        }

        let since = (Utc::now() - Duration::days(days)).naive_utc();
        let period = self.repo.seller_period(seller_id, since).await?;

        Ok(SellerPerformance {
            period_days: days,
            orders_count: period.orders_count,
            revenue_cents: period.revenue_cents,
            plants_sold: period.plants_sold,
            average_order_value_cents: average(period.revenue_cents, period.orders_count),
        })
    }
}
