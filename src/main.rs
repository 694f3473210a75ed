use std::sync::Arc;
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use verdant::{
    api,
    config::Settings,
    integrations::{
        Collaborators, DisabledClassifier, HttpPlantClassifier, LocalBlobStorage,
        PlantClassifier, TextInvoiceRenderer,
    },
    service::ServiceContext,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let settings = Settings::new().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config: {}. Using defaults.", e);
        Settings::default()
    });

    tracing::info!("Starting Verdant server on {}:{}", settings.server.host, settings.server.port);

    // Initialize database
    let db_pool = SqlitePoolOptions::new()
        .max_connections(settings.database.max_connections)
        .connect(&settings.database.url)
        .await?;

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    // Outside collaborators
    let classifier: Arc<dyn PlantClassifier> = match HttpPlantClassifier::new(&settings.vision) {
        Some(classifier) => {
            tracing::info!("Plant identification enabled");
            Arc::new(classifier)
        }
        None => {
            tracing::info!("Plant identification disabled");
            Arc::new(DisabledClassifier)
        }
    };
    let collaborators = Collaborators::new(
        Arc::new(LocalBlobStorage::new(&settings.storage)),
        classifier,
        Arc::new(TextInvoiceRenderer),
    );

    for (name, status) in collaborators.health_check_all().await {
        tracing::info!("Collaborator {} is {}", name, status);
    }

    if settings.payments.razorpay.enabled {
        tracing::info!("Razorpay payments enabled");
    } else {
        tracing::info!("Razorpay payments disabled");
    }

    let service_context = Arc::new(ServiceContext::new(db_pool.clone(), collaborators, &settings));

    let removed = service_context.auth_service.cleanup_expired_sessions().await?;
    if removed > 0 {
        tracing::info!("Removed {} expired sessions", removed);
    }

    let app = api::create_app(service_context, Arc::new(settings.clone()));

    let listener = tokio::net::TcpListener::bind(
        format!("{}:{}", settings.server.host, settings.server.port)
    ).await?;

    tracing::info!("Server listening on http://{}:{}", settings.server.host, settings.server.port);

    axum::serve(listener, app).await?;

    Ok(())
}
