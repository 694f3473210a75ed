use async_trait::async_trait;
use chrono::NaiveDateTime;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod analytics_repository;
pub mod announcement_repository;
pub mod audit_repository;
pub mod cart_repository;
pub mod delivery_repository;
pub mod notification_repository;
pub mod order_repository;
pub mod payment_repository;
pub mod plant_repository;
pub mod prediction_repository;
pub mod review_repository;
pub mod store_repository;
pub mod user_repository;

pub use analytics_repository::{PeriodTotals, SellerTotals, SqliteAnalyticsRepository};
pub use announcement_repository::SqliteAnnouncementRepository;
pub use audit_repository::SqliteAuditRepository;
pub use cart_repository::SqliteCartRepository;
pub use delivery_repository::SqliteDeliveryAgentRepository;
pub use notification_repository::SqliteNotificationRepository;
pub use order_repository::{OrderParty, SqliteOrderRepository};
pub use payment_repository::SqlitePaymentRepository;
pub use plant_repository::SqlitePlantRepository;
pub use prediction_repository::SqlitePredictionRepository;
pub use review_repository::SqliteReviewRepository;
pub use store_repository::SqliteStoreRepository;
pub use user_repository::SqliteUserRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: &CreateUserRequest, password_hash: &str, role: UserRole) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn password_hash(&self, email: &str) -> Result<Option<(Uuid, String)>>;
    async fn list(&self, filter: &UserFilter, page: PageParams) -> Result<(Vec<User>, i64)>;
    async fn admin_update(&self, id: Uuid, update: &AdminUpdateUserRequest) -> Result<User>;
    async fn update_vendor_status(&self, id: Uuid, status: ApprovalStatus) -> Result<User>;
}

#[async_trait]
pub trait PlantRepository: Send + Sync {
    async fn create(&self, seller_id: Uuid, request: &CreatePlantRequest, approval_status: ApprovalStatus) -> Result<Plant>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Plant>>;
    async fn search(&self, filter: &PlantSearch, page: PageParams) -> Result<(Vec<Plant>, i64)>;
    async fn list_by_seller(&self, seller_id: Uuid) -> Result<Vec<Plant>>;
    async fn update(&self, id: Uuid, update: &UpdatePlantRequest) -> Result<Plant>;
    async fn deactivate(&self, id: Uuid) -> Result<()>;
    async fn set_image_url(&self, id: Uuid, url: &str) -> Result<Plant>;
    async fn set_approval_status(&self, id: Uuid, status: ApprovalStatus) -> Result<Plant>;
}

#[async_trait]
pub trait CartRepository: Send + Sync {
    async fn find_or_create(&self, user_id: Uuid) -> Result<Cart>;
    async fn add_item(&self, cart_id: Uuid, plant_id: Uuid, quantity: i64, unit_price_cents: i64) -> Result<()>;
    async fn set_item_quantity(&self, cart_id: Uuid, item_id: Uuid, quantity: i64) -> Result<()>;
    async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<()>;
    async fn clear(&self, cart_id: Uuid) -> Result<()>;
}

/// Read side of orders. Mutations run inside service transactions through the
/// connection-level statements on `SqliteOrderRepository`.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>>;
    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;
    async fn list_for(&self, party: OrderParty, user_id: Uuid, page: PageParams) -> Result<(Vec<Order>, i64)>;
    async fn list_by_agent(&self, agent_id: Uuid) -> Result<Vec<Order>>;
    async fn timeline(&self, order_id: Uuid) -> Result<Vec<TimelineEntry>>;
    async fn stats_for(&self, party: OrderParty, user_id: Uuid) -> Result<OrderStats>;
}

#[async_trait]
pub trait DeliveryAgentRepository: Send + Sync {
    async fn create(&self, request: &CreateAgentRequest) -> Result<DeliveryAgent>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<DeliveryAgent>>;
    async fn list(&self, status: Option<AgentStatus>, page: PageParams) -> Result<(Vec<DeliveryAgent>, i64)>;
    async fn update(&self, id: Uuid, update: &UpdateAgentRequest) -> Result<DeliveryAgent>;
    async fn set_status(&self, id: Uuid, status: AgentStatus) -> Result<DeliveryAgent>;
    async fn stats(&self) -> Result<DeliveryStats>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    async fn create(&self, payment: &Payment) -> Result<Payment>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn find_by_provider_order_id(&self, provider_order_id: &str) -> Result<Option<Payment>>;
    async fn find_by_order(&self, order_id: Uuid) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, user_id: Uuid, request: &CreateReviewRequest) -> Result<Review>;
    async fn list_by_plant(&self, plant_id: Uuid) -> Result<Vec<Review>>;
}

#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn create(&self, prediction: &Prediction) -> Result<()>;
    async fn list_by_user(&self, user_id: Uuid, limit: i64) -> Result<Vec<Prediction>>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(&self, request: &CreateAnnouncementRequest, created_by: Option<Uuid>) -> Result<Announcement>;
    async fn list(&self, active_only: bool) -> Result<Vec<Announcement>>;
    async fn deactivate(&self, id: Uuid) -> Result<()>;
}

/// Append-only.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn create(&self, entry: &AuditEntry) -> Result<AuditLog>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<AuditLog>>;
    async fn list(&self, filter: &AuditLogFilter, page: PageParams) -> Result<(Vec<AuditLog>, i64)>;
}

#[async_trait]
pub trait StoreRepository: Send + Sync {
    async fn create(&self, request: &CreateStoreRequest) -> Result<Store>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Store>>;
    async fn list(&self, page: PageParams) -> Result<(Vec<Store>, i64)>;
    /// Stores whose latitude falls within the band, for distance filtering.
    async fn in_latitude_band(&self, min_lat: f64, max_lat: f64) -> Result<Vec<Store>>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn upsert_device_token(&self, user_id: Uuid, request: &RegisterDeviceTokenRequest) -> Result<DeviceToken>;
    async fn device_tokens(&self, user_id: Uuid) -> Result<Vec<DeviceToken>>;
    async fn preferences(&self, user_id: Uuid) -> Result<NotificationPreferences>;
    async fn update_preferences(&self, user_id: Uuid, update: &UpdateNotificationPreferences) -> Result<NotificationPreferences>;
}

#[async_trait]
pub trait AnalyticsRepository: Send + Sync {
    async fn ping(&self) -> Result<()>;
    async fn dashboard_stats(&self) -> Result<DashboardStats>;
    async fn user_stats(&self) -> Result<UserStats>;
    async fn plant_stats(&self, top_limit: i64) -> Result<PlantStats>;
    async fn order_stats(&self) -> Result<AdminOrderStats>;
    async fn revenue_by_month(&self, seller_id: Option<Uuid>) -> Result<Vec<MonthlyAmount>>;
    async fn top_sellers(&self, limit: i64) -> Result<Vec<TopSeller>>;
    async fn recent_orders(&self, seller_id: Option<Uuid>, limit: i64) -> Result<Vec<RecentOrder>>;
    async fn recent_plants(&self, limit: i64) -> Result<Vec<RecentPlant>>;
    async fn seller_totals(&self, seller_id: Uuid) -> Result<SellerTotals>;
    async fn seller_top_selling(&self, seller_id: Uuid, limit: i64) -> Result<Vec<TopSellingPlant>>;
    async fn seller_period(&self, seller_id: Uuid, since: NaiveDateTime) -> Result<PeriodTotals>;
}
