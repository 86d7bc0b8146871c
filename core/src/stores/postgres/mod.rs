//! PostgreSQL storage for the issuance ledger and key catalog.

pub mod ledger;

// Re-exports
pub use ledger::PostgresLinkLedger;
