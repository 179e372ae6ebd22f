pub mod price_feed_cache;

pub use price_feed_cache::PriceFeedCache;
