//! Defines the defaults and bounds applied to transaction listing queries.

use crate::stores::{SortKey, SortOrder};

/// The config for paging and ordering transaction listings.
///
/// Every fallback the listing path applies when a caller omits a parameter
/// lives here, so call sites never bake in their own defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The number of transactions per page when not specified in a request.
    pub default_page_size: u64,
    /// The largest page size a request may ask for.
    pub max_page_size: u64,
    /// The field to sort by when not specified in a request.
    pub default_sort_key: SortKey,
    /// The sort direction when not specified in a request.
    pub default_sort_order: SortOrder,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_page_size: 100,
            default_sort_key: SortKey::Date,
            default_sort_order: SortOrder::Descending,
        }
    }
}
