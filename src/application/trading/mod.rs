pub mod transaction_ledger;

pub use transaction_ledger::TransactionLedger;
