// Core trading domain: order sides, ledger records, settlement and holdings rules
pub mod holdings;
pub mod settlement;
pub mod types;
