mod connection;
mod ledger_repository;

pub use connection::SqliteStorage;
pub use ledger_repository::SqliteLedgerStore;
