//! Defines the transaction store trait and its query types.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    database_id::{OwnerId, TransactionId},
    transaction::{Transaction, TransactionBuilder, TransactionKind, TransactionPatch},
};

/// Handles the storage and retrieval of transactions.
///
/// The engine issues every multi-record read through an owner-scoped
/// [TransactionFilter], so implementers never return another owner's
/// records from [TransactionStore::get_query] or [TransactionStore::count].
/// Single-record operations look up by ID alone; the ownership check is the
/// service's responsibility.
pub trait TransactionStore {
    /// Create a new transaction in the store and assign it an ID.
    fn create(&mut self, builder: TransactionBuilder) -> Result<Transaction, Error>;

    /// Retrieve a transaction from the store by its ID.
    fn get(&self, id: TransactionId) -> Result<Transaction, Error>;

    /// Retrieve transactions from the store in the way defined by `query`.
    fn get_query(&self, query: StoreQuery) -> Result<Vec<Transaction>, Error>;

    /// Get the number of transactions matching `filter`, ignoring pagination.
    fn count(&self, filter: &TransactionFilter) -> Result<u64, Error>;

    /// Overwrite the fields provided in `patch`, keeping the rest.
    ///
    /// Implementers must return [Error::NotFound](crate::Error::NotFound)
    /// when `id` does not refer to a stored transaction.
    fn update(&mut self, id: TransactionId, patch: &TransactionPatch) -> Result<Transaction, Error>;

    /// Remove a transaction from the store.
    ///
    /// Implementers must return [Error::NotFound](crate::Error::NotFound)
    /// when `id` does not refer to a stored transaction, so that a repeated
    /// delete never reports a silent success.
    fn delete(&mut self, id: TransactionId) -> Result<(), Error>;
}

/// Selects the subset of one owner's transactions that match every provided
/// criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionFilter {
    /// The owner whose transactions should be selected.
    pub owner: OwnerId,
    /// Include only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Include only transactions within `date_range` (inclusive).
    pub date_range: Option<RangeInclusive<Date>>,
    /// Include only transactions whose description contains this text,
    /// compared case-insensitively.
    pub search: Option<String>,
}

impl TransactionFilter {
    /// Create a filter that selects all of `owner`'s transactions.
    pub fn new(owner: OwnerId) -> Self {
        Self {
            owner,
            kind: None,
            date_range: None,
            search: None,
        }
    }
}

/// Defines how transactions should be fetched from
/// [TransactionStore::get_query].
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    /// Selects the transactions to return.
    pub filter: TransactionFilter,
    /// The field to order transactions by.
    pub sort_key: SortKey,
    /// The direction to order transactions in. Ties within the same sort key
    /// value always break by ID ascending, keeping pagination stable.
    pub sort_order: SortOrder,
    /// Skips the first N matching transactions.
    pub offset: u64,
    /// Selects up to the first N (`limit`) transactions after the offset.
    /// `None` returns all matching transactions.
    pub limit: Option<u64>,
}

impl StoreQuery {
    /// Create a query returning everything `filter` matches, ordered by date
    /// ascending.
    pub fn new(filter: TransactionFilter) -> Self {
        Self {
            filter,
            sort_key: SortKey::Date,
            sort_order: SortOrder::Ascending,
            offset: 0,
            limit: None,
        }
    }
}

/// The field to sort transactions by in a [StoreQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Sort by the date the transaction occurred.
    Date,
    /// Sort by the transaction amount.
    Amount,
}

/// The order to sort transactions in a [StoreQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Sort in order of increasing value.
    #[serde(rename = "asc")]
    Ascending,
    /// Sort in order of decreasing value.
    #[serde(rename = "desc")]
    Descending,
}
