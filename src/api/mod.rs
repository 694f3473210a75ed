pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{
    config::{CorsConfig, Settings},
    integrations::storage::MAX_FILE_SIZE,
    service::ServiceContext,
};
use state::AppState;

/// Multipart overhead on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings.clone());

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        .nest("/auth", auth_routes(app_state.clone()))
        .nest("/api", api_routes(app_state.clone()))
        .nest("/admin", admin_routes(app_state.clone()))

        // Locally stored uploads
        .nest_service("/uploads", ServeDir::new(&settings.storage.uploads_dir))

        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(cors_layer(&settings.cors))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

fn with_auth(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_auth,
    ))
}

fn with_admin(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router.route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth::require_admin,
    ))
}

fn auth_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .merge(with_auth(
            Router::new().route("/me", get(handlers::auth::me)),
            &state,
        ))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/plants", plant_routes(&state))
        .nest("/cart", cart_routes(&state))
        .nest("/orders", order_routes(&state))
        .nest("/delivery", delivery_routes(&state))
        .nest("/payments", payment_routes(&state))
        .nest("/reviews", review_routes(&state))
        .nest("/seller", seller_routes(&state))
        .nest("/stores", store_routes())
        .nest("/categories", category_routes())
        .nest("/notifications", notification_routes(&state))
}

fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/nearby", get(handlers::stores::nearby))
        .route("/:id", get(handlers::stores::get))
}

fn category_routes() -> Router<AppState> {
    Router::new().route("/tree", get(handlers::categories::tree))
}

fn notification_routes(state: &AppState) -> Router<AppState> {
    with_auth(
        Router::new()
            .route(
                "/register-token",
                post(handlers::notifications::register_token),
            )
            .route("/tokens", get(handlers::notifications::list_tokens))
            .route(
                "/preferences",
                get(handlers::notifications::preferences)
                    .put(handlers::notifications::update_preferences),
            ),
        state,
    )
}

fn plant_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Public catalog
        .route("/", get(handlers::plants::list))
        .route("/:id", get(handlers::plants::get))
        .merge(with_auth(
            Router::new()
                .route("/", post(handlers::plants::create))
                .route("/mine", get(handlers::plants::mine))
                .route("/identify", post(handlers::plants::identify))
                .route("/predictions", get(handlers::plants::predictions))
                .route("/:id", put(handlers::plants::update).delete(handlers::plants::delete))
                .route("/:id/image", post(handlers::plants::upload_image))
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
            state,
        ))
}

fn cart_routes(state: &AppState) -> Router<AppState> {
    with_auth(
        Router::new()
            .route("/", get(handlers::cart::get))
            .route("/items", post(handlers::cart::add_item))
            .route(
                "/items/:id",
                put(handlers::cart::update_item).delete(handlers::cart::remove_item),
            )
            .route("/clear", delete(handlers::cart::clear)),
        state,
    )
}

fn order_routes(state: &AppState) -> Router<AppState> {
    with_auth(
        Router::new()
            .route("/", post(handlers::orders::create).get(handlers::orders::list_mine))
            .route("/seller", get(handlers::orders::list_seller))
            .route("/stats", get(handlers::orders::stats))
            .route("/checkout", post(handlers::orders::checkout))
            .route("/:id", get(handlers::orders::get))
            .route("/:id/timeline", get(handlers::orders::timeline))
            .route("/:id/status", put(handlers::orders::update_status))
            .route("/:id/cancel", put(handlers::orders::cancel))
            .route("/:id/invoice", get(handlers::orders::invoice)),
        state,
    )
    .merge(with_admin(
        Router::new().route("/:id/assign-delivery", put(handlers::orders::assign_delivery)),
        state,
    ))
}

fn delivery_routes(state: &AppState) -> Router<AppState> {
    with_admin(
        Router::new()
            .route(
                "/agents",
                post(handlers::delivery::create_agent).get(handlers::delivery::list_agents),
            )
            .route("/agents/available", get(handlers::delivery::available_agents))
            .route(
                "/agents/:id",
                get(handlers::delivery::get_agent).put(handlers::delivery::update_agent),
            )
            .route("/agents/:id/status", put(handlers::delivery::set_agent_status))
            .route("/agents/:id/orders", get(handlers::delivery::agent_orders))
            .route("/orders/:id/complete", put(handlers::delivery::complete_order))
            .route("/stats", get(handlers::delivery::stats)),
        state,
    )
}

fn payment_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        // Gateway callback (no session)
        .route("/razorpay/webhook", post(handlers::payments::razorpay_webhook))
        .merge(with_auth(
            Router::new()
                .route("/razorpay/order", post(handlers::payments::create_razorpay_order))
                .route("/cod/confirm", post(handlers::payments::confirm_cod)),
            state,
        ))
}

fn review_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/plant/:id", get(handlers::reviews::for_plant))
        .merge(with_auth(
            Router::new().route("/", post(handlers::reviews::create)),
            state,
        ))
}

fn seller_routes(state: &AppState) -> Router<AppState> {
    with_auth(
        Router::new()
            .route("/dashboard", get(handlers::seller::dashboard))
            .route("/stats", get(handlers::seller::stats))
            .route("/earnings", get(handlers::seller::earnings))
            .route("/performance", get(handlers::seller::performance)),
        state,
    )
}

fn admin_routes(state: AppState) -> Router<AppState> {
    with_admin(
        Router::new()
            .route("/dashboard", get(handlers::admin::dashboard))
            .route("/stats/users", get(handlers::admin::user_stats))
            .route("/stats/plants", get(handlers::admin::plant_stats))
            .route("/stats/orders", get(handlers::admin::order_stats))
            .route("/stats/revenue", get(handlers::admin::revenue_stats))
            .route("/top-sellers", get(handlers::admin::top_sellers))
            .route("/recent-orders", get(handlers::admin::recent_orders))
            .route("/recent-plants", get(handlers::admin::recent_plants))
            .route("/vendors/:id/status", put(handlers::admin::set_vendor_status))
            .route("/plants/:id/status", put(handlers::admin::set_plant_status))
            .route("/orders/:id/invoice", get(handlers::admin::order_invoice))
            .route(
                "/announcements",
                post(handlers::admin::create_announcement).get(handlers::admin::list_announcements),
            )
            .route("/announcements/:id", delete(handlers::admin::delete_announcement))
            .route(
                "/users",
                post(handlers::admin::create_user).get(handlers::admin::list_users),
            )
            .route(
                "/users/:id",
                get(handlers::admin::get_user).put(handlers::admin::update_user),
            )
            .route("/audit-logs", get(handlers::admin::list_audit_logs))
            .route("/audit-logs/:id", get(handlers::admin::get_audit_log))
            .route(
                "/stores",
                post(handlers::admin::create_store).get(handlers::admin::list_stores),
            )
            .route("/health", get(handlers::admin::health)),
        &state,
    )
}
