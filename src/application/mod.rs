// Registration, login and per-user views
pub mod accounts;
pub mod bootstrap;

// Instrument catalog and feed sync
pub mod catalog;

// Market data caching
pub mod market_data;

pub mod portfolio;
pub mod trading;

// System orchestrator
pub mod system;
