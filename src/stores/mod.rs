//! Contains the trait and implementations for objects that store
//! [transactions](crate::transaction::Transaction).

mod transaction;

pub mod sqlite;

pub use transaction::{SortKey, SortOrder, StoreQuery, TransactionFilter, TransactionStore};
