use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::bootstrap::{
    persistence::{PersistenceBootstrap, PersistenceHandle},
    services::{ServicesBootstrap, ServicesHandle},
};
use crate::config::Config;
use crate::domain::ports::{AuthProvider, MarketFeed};
use crate::infrastructure::auth::JwtAuthProvider;
use crate::infrastructure::coingecko::CoinGeckoMarketFeed;
use crate::interfaces::http::{AppState, create_router};

pub struct Application {
    pub config: Config,
    pub persistence: PersistenceHandle,
    pub services: ServicesHandle,
}

impl Application {
    /// Wires the production stack: SQLite at `DATABASE_URL`, CoinGecko feed
    /// and JWT auth.
    pub async fn build(config: Config) -> Result<Self> {
        info!("Building tradedesk application...");

        let persistence = PersistenceBootstrap::init(&config.database_url).await?;

        let feed: Arc<dyn MarketFeed> = Arc::new(
            CoinGeckoMarketFeed::builder()
                .base_url(config.feed.base_url.clone())
                .timeout(config.feed.timeout())
                .max_retries(config.feed.max_retries)
                .build(),
        );

        Ok(Self::with_parts(config, persistence, feed))
    }

    /// Wires the services over caller-provided storage and feed.
    pub fn with_parts(
        config: Config,
        persistence: PersistenceHandle,
        feed: Arc<dyn MarketFeed>,
    ) -> Self {
        if config.auth.uses_dev_secret() {
            warn!("JWT_SECRET is not set, tokens are signed with the development placeholder");
        }

        let auth: Arc<dyn AuthProvider> = Arc::new(JwtAuthProvider::new(
            &config.auth.jwt_secret,
            config.auth.token_ttl(),
        ));

        let services = ServicesBootstrap::init(&config.feed, &persistence, feed, auth);

        Self {
            config,
            persistence,
            services,
        }
    }

    pub fn router(&self) -> axum::Router {
        let state = AppState {
            services: self.services.clone(),
            feed: Arc::new(self.config.feed.clone()),
        };
        create_router(state, &self.config.server.cors_allowed_origins)
    }

    /// Serves the HTTP API until Ctrl+C.
    pub async fn run(self) -> Result<()> {
        let address = self.config.server.socket_address();
        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {}", address))?;

        info!("HTTP API listening on {}", address);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        if let Some(db) = &self.persistence.db {
            db.pool.close().await;
        }
        info!("Server stopped.");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}
