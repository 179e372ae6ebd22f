pub mod instrument_catalog;

pub use instrument_catalog::{InstrumentCatalog, Lookup, SyncReport};
