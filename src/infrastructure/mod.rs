pub mod auth;
pub mod coingecko;
pub mod core;
pub mod mock;
pub mod observability;
pub mod repositories;

pub use auth::JwtAuthProvider;
pub use coingecko::CoinGeckoMarketFeed;
pub use mock::MockMarketFeed;
pub use repositories::InMemoryStore;
pub mod persistence;
