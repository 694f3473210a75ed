#![allow(dead_code)]

use std::sync::Arc;

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;
use verdant::{
    auth::AuthService,
    config::Settings,
    domain::*,
    integrations::{Collaborators, DisabledClassifier, LocalBlobStorage, TextInvoiceRenderer},
    repository::{PlantRepository, SqlitePlantRepository, SqliteUserRepository, UserRepository},
    service::ServiceContext,
};

pub const PASSWORD: &str = "correct-horse-battery";

/// One connection, so every query sees the same in-memory database.
pub async fn memory_pool() -> anyhow::Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// A throwaway database file, for tests that need several live connections.
pub async fn file_pool(connections: u32) -> anyhow::Result<SqlitePool> {
    let path = std::env::temp_dir().join(format!("verdant-test-{}.db", Uuid::new_v4()));
    let pool = SqlitePoolOptions::new()
        .max_connections(connections)
        .connect(&format!("sqlite://{}?mode=rwc", path.display()))
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.storage.uploads_dir = std::env::temp_dir()
        .join("verdant-test-uploads")
        .display()
        .to_string();
    settings
}

pub fn context(pool: SqlitePool, settings: &Settings) -> ServiceContext {
    let collaborators = Collaborators::new(
        Arc::new(LocalBlobStorage::new(&settings.storage)),
        Arc::new(DisabledClassifier),
        Arc::new(TextInvoiceRenderer),
    );
    ServiceContext::new(pool, collaborators, settings)
}

pub async fn setup() -> anyhow::Result<ServiceContext> {
    Ok(context(memory_pool().await?, &test_settings()))
}

pub async fn user(ctx: &ServiceContext, name: &str, role: UserRole) -> anyhow::Result<User> {
    let repo = SqliteUserRepository::new(ctx.db_pool.clone());
    let request = CreateUserRequest {
        name: name.to_string(),
        email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4().simple()),
        password: PASSWORD.to_string(),
        phone: None,
        address: None,
    };
    let hash = AuthService::hash_password(PASSWORD)?;
    Ok(repo.create(&request, &hash, role).await?)
}

pub async fn seller(ctx: &ServiceContext, name: &str) -> anyhow::Result<User> {
    let created = user(ctx, name, UserRole::Seller).await?;
    let repo = SqliteUserRepository::new(ctx.db_pool.clone());
    Ok(repo
        .update_vendor_status(created.id, ApprovalStatus::Approved)
        .await?)
}

/// An approved, active listing.
pub async fn plant(
    ctx: &ServiceContext,
    seller: &User,
    name: &str,
    price_cents: i64,
    stock_quantity: i64,
) -> anyhow::Result<Plant> {
    let repo = SqlitePlantRepository::new(ctx.db_pool.clone());
    let request = CreatePlantRequest {
        name: name.to_string(),
        description: None,
        price_cents,
        category: Some("Indoor".to_string()),
        species: None,
        care_instructions: None,
        stock_quantity,
        image_url: None,
        verified_by_ai: false,
    };
    Ok(repo.create(seller.id, &request, ApprovalStatus::Approved).await?)
}

pub async fn stock_of(ctx: &ServiceContext, plant_id: Uuid) -> anyhow::Result<i64> {
    Ok(ctx.catalog_service.get(plant_id).await?.stock_quantity)
}

pub async fn add_to_cart(
    ctx: &ServiceContext,
    buyer: &User,
    plant_id: Uuid,
    quantity: i64,
) -> anyhow::Result<CartSummary> {
    Ok(ctx
        .cart_service
        .add_item(buyer.id, AddCartItemRequest { plant_id, quantity })
        .await?)
}

pub fn checkout_request(payment_method: PaymentMethod) -> CheckoutRequest {
    CheckoutRequest {
        shipping_address: "42 Greenhouse Road".to_string(),
        notes: None,
        payment_method,
    }
}

pub async fn agent(ctx: &ServiceContext, name: &str) -> anyhow::Result<DeliveryAgent> {
    Ok(ctx
        .delivery_service
        .create(CreateAgentRequest {
            name: name.to_string(),
            phone: format!("+91{}", &Uuid::new_v4().simple().to_string()[..10]),
            email: None,
            current_location: None,
        })
        .await?)
}
