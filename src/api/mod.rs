pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use state::AppState;

pub fn create_app(app_state: AppState) -> Router {
    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Public checkout routes
        .route("/offers/:slug", get(handlers::offers::get))
        .route("/offers/:slug", post(handlers::offers::process))
        // Provider webhook endpoints (no auth; validated against orders)
        .route("/webhooks/tinkoff", post(handlers::webhooks::tinkoff))
        .route("/webhooks/prodamus", post(handlers::webhooks::prodamus))
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}
