//! HTTP API (axum)
//!
//! Thin adapter over the application services. Handlers parse and
//! authenticate, services decide, `ApiError` maps the outcome to a status.

pub mod auth;
pub mod dto;
pub mod error;
pub mod handlers;

use crate::application::bootstrap::services::ServicesHandle;
use crate::config::FeedEnvConfig;
use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub services: ServicesHandle,
    pub feed: Arc<FeedEnvConfig>,
}

/// Create the HTTP router with all endpoints.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/users/{username}", get(handlers::get_user))
        .route("/transactions", post(handlers::create_transaction))
        .route("/transactions/{username}", get(handlers::list_transactions))
        .route(
            "/stocks",
            get(handlers::list_stocks).post(handlers::create_stock),
        )
        .route(
            "/stocks/",
            get(handlers::list_stocks).post(handlers::create_stock),
        )
        .route("/stocks/{ticker}", get(handlers::get_stock))
        .route("/api/crypto/top20", get(handlers::top_cryptocurrencies))
        .route("/api/stocks/sync-crypto", post(handlers::sync_cryptocurrencies))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    // Credentials rule out wildcards, so methods and headers mirror the request
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
