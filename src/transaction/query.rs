//! Translates caller-supplied listing parameters into a bounded, validated
//! store query.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    config::QueryConfig,
    database_id::OwnerId,
    error::ValidationError,
    stores::{SortKey, SortOrder, StoreQuery, TransactionFilter},
    transaction::{Transaction, TransactionKind},
};

/// The parameters a caller may supply when listing transactions.
///
/// Every field is optional; omitted fields fall back to the defaults in
/// [QueryConfig]. Supplying `from` without `to` (or vice versa) leaves the
/// other end of the date range unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionListParams {
    /// Include only transactions of this kind.
    pub kind: Option<TransactionKind>,
    /// Include only transactions on or after this date.
    pub from: Option<Date>,
    /// Include only transactions on or before this date.
    pub to: Option<Date>,
    /// Include only transactions whose description contains this text,
    /// compared case-insensitively.
    pub search: Option<String>,
    /// The field to sort by.
    pub sort_by: Option<SortKey>,
    /// The direction to sort in.
    pub sort_order: Option<SortOrder>,
    /// The page to return, starting at 1.
    pub page: Option<u64>,
    /// The number of transactions per page.
    pub page_size: Option<u64>,
}

/// One page of a transaction listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionPage {
    /// The transactions on this page, at most `page_size` of them.
    pub items: Vec<Transaction>,
    /// The number of transactions matching the filter across all pages.
    pub total: u64,
    /// The number of pages the filtered transactions span. Zero when
    /// nothing matched.
    pub total_pages: u64,
    /// The page that was returned.
    pub page: u64,
    /// The page size that was applied.
    pub page_size: u64,
}

/// A validated listing query, ready to run against the store.
#[derive(Debug, PartialEq)]
pub(crate) struct ResolvedQuery {
    pub(crate) store_query: StoreQuery,
    pub(crate) page: u64,
    pub(crate) page_size: u64,
}

/// Apply the configured defaults and bounds to `params`.
///
/// An inverted date range (`from` after `to`) is deliberately not an error:
/// it selects nothing, and the resulting page is simply empty.
///
/// # Errors
/// Returns a [ValidationError] wrapped in [Error::Validation] if `page` is
/// zero, or if `page_size` is zero or larger than the configured maximum.
pub(crate) fn resolve_query(
    owner: OwnerId,
    params: TransactionListParams,
    config: &QueryConfig,
) -> Result<ResolvedQuery, Error> {
    let page = params.page.unwrap_or(config.default_page);
    if page == 0 {
        return Err(ValidationError::ZeroPage.into());
    }

    let page_size = params.page_size.unwrap_or(config.default_page_size);
    if page_size == 0 || page_size > config.max_page_size {
        return Err(ValidationError::InvalidPageSize(config.max_page_size).into());
    }

    let date_range = match (params.from, params.to) {
        (None, None) => None,
        (from, to) => Some(from.unwrap_or(Date::MIN)..=to.unwrap_or(Date::MAX)),
    };

    let filter = TransactionFilter {
        owner,
        kind: params.kind,
        date_range,
        search: params.search.filter(|needle| !needle.is_empty()),
    };

    Ok(ResolvedQuery {
        store_query: StoreQuery {
            filter,
            sort_key: params.sort_by.unwrap_or(config.default_sort_key),
            sort_order: params.sort_order.unwrap_or(config.default_sort_order),
            offset: (page - 1) * page_size,
            limit: Some(page_size),
        },
        page,
        page_size,
    })
}
