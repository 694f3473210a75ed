pub mod analytics_service;
pub mod announcement_service;
pub mod audit_service;
pub mod cart_service;
pub mod catalog_service;
pub mod delivery_service;
pub mod notification_service;
pub mod order_service;
pub mod payment_service;
pub mod review_service;
pub mod store_service;
pub mod user_service;
pub mod vision_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::Settings;
use crate::integrations::Collaborators;
use crate::repository::*;
use analytics_service::AnalyticsService;
use announcement_service::AnnouncementService;
use audit_service::AuditService;
use cart_service::CartService;
use catalog_service::CatalogService;
use delivery_service::DeliveryService;
use notification_service::NotificationService;
use order_service::OrderService;
use payment_service::PaymentService;
use review_service::ReviewService;
use store_service::StoreService;
use user_service::UserService;
use vision_service::VisionService;

pub use order_service::RenderedInvoice;

/// Services wired over the SQLite repositories and the outside collaborators.
pub struct ServiceContext {
    pub user_service: Arc<UserService>,
    pub catalog_service: Arc<CatalogService>,
    pub cart_service: Arc<CartService>,
    pub order_service: Arc<OrderService>,
    pub delivery_service: Arc<DeliveryService>,
    pub payment_service: Arc<PaymentService>,
    pub review_service: Arc<ReviewService>,
    pub vision_service: Arc<VisionService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub audit_service: Arc<AuditService>,
    pub store_service: Arc<StoreService>,
    pub notification_service: Arc<NotificationService>,
    pub auth_service: Arc<AuthService>,
    pub collaborators: Collaborators,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(db_pool: SqlitePool, collaborators: Collaborators, settings: &Settings) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let plant_repo: Arc<dyn PlantRepository> = Arc::new(SqlitePlantRepository::new(db_pool.clone()));
        let cart_repo: Arc<dyn CartRepository> = Arc::new(SqliteCartRepository::new(db_pool.clone()));
        let order_repo: Arc<dyn OrderRepository> = Arc::new(SqliteOrderRepository::new(db_pool.clone()));
        let agent_repo: Arc<dyn DeliveryAgentRepository> =
            Arc::new(SqliteDeliveryAgentRepository::new(db_pool.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(SqlitePaymentRepository::new(db_pool.clone()));
        let review_repo: Arc<dyn ReviewRepository> = Arc::new(SqliteReviewRepository::new(db_pool.clone()));
        let prediction_repo: Arc<dyn PredictionRepository> =
            Arc::new(SqlitePredictionRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> =
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let analytics_repo: Arc<dyn AnalyticsRepository> =
            Arc::new(SqliteAnalyticsRepository::new(db_pool.clone()));
        let audit_repo: Arc<dyn AuditRepository> = Arc::new(SqliteAuditRepository::new(db_pool.clone()));
        let store_repo: Arc<dyn StoreRepository> = Arc::new(SqliteStoreRepository::new(db_pool.clone()));
        let notification_repo: Arc<dyn NotificationRepository> =
            Arc::new(SqliteNotificationRepository::new(db_pool.clone()));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            settings.auth.session_duration_hours,
        ));
        let audit_service = Arc::new(AuditService::new(audit_repo));

        Self {
            user_service: Arc::new(UserService::new(
                user_repo.clone(),
                auth_service.clone(),
                audit_service.clone(),
            )),
            catalog_service: Arc::new(CatalogService::new(
                plant_repo.clone(),
                collaborators.storage.clone(),
            )),
            cart_service: Arc::new(CartService::new(cart_repo.clone(), plant_repo.clone())),
            order_service: Arc::new(OrderService::new(
                db_pool.clone(),
                order_repo.clone(),
                cart_repo,
                plant_repo.clone(),
                user_repo,
                agent_repo.clone(),
                collaborators.invoices.clone(),
                settings.payments.currency.clone(),
            )),
            delivery_service: Arc::new(DeliveryService::new(agent_repo.clone(), order_repo.clone())),
            payment_service: Arc::new(PaymentService::new(
                db_pool.clone(),
                payment_repo,
                order_repo,
                settings.payments.clone(),
            )),
            review_service: Arc::new(ReviewService::new(review_repo, plant_repo)),
            vision_service: Arc::new(VisionService::new(
                prediction_repo,
                collaborators.classifier.clone(),
                collaborators.storage.clone(),
            )),
            analytics_service: Arc::new(AnalyticsService::new(
                analytics_repo,
                agent_repo,
                collaborators.clone(),
            )),
            announcement_service: Arc::new(AnnouncementService::new(announcement_repo)),
            audit_service,
            store_service: Arc::new(StoreService::new(store_repo)),
            notification_service: Arc::new(NotificationService::new(notification_repo)),
            auth_service,
            collaborators,
            db_pool,
        }
    }
}
