//! Contains the SQLite implementation of the
//! [TransactionStore](crate::stores::TransactionStore) trait.

mod transaction;

pub use transaction::SQLiteTransactionStore;
