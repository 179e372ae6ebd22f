// Tradable instruments and the market-data feed payload
pub mod instrument;
pub mod quote;
