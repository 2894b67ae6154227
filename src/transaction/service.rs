//! Orchestrates validation, ownership checks and store calls for
//! transactions.

use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    config::QueryConfig,
    database_id::{OwnerId, TransactionId},
    error::ValidationError,
    forecast::{self, DEFAULT_WINDOW_MONTHS, ForecastResult},
    stores::{SortKey, SortOrder, StoreQuery, TransactionFilter, TransactionStore},
};

use super::{
    model::{Transaction, TransactionDraft, TransactionKind, TransactionPatch},
    query::{TransactionListParams, TransactionPage, resolve_query},
};

/// The engine's entry point for everything transaction related.
///
/// Wraps a [TransactionStore] and enforces the rules the store does not:
/// payload validation and the ownership boundary. Every operation takes the
/// requesting [OwnerId] explicitly; a request for a transaction that exists
/// but belongs to someone else fails with
/// [Error::Forbidden](crate::Error::Forbidden).
///
/// The service keeps no state between calls, so concurrent requests only
/// contend on the store itself. Two writes racing on the same record are
/// not serialized here; the store's last write wins, and a lookup racing a
/// delete may observe [Error::NotFound](crate::Error::NotFound).
#[derive(Debug, Clone)]
pub struct TransactionService<S: TransactionStore> {
    store: S,
    config: QueryConfig,
}

impl<S: TransactionStore> TransactionService<S> {
    /// Create a service on top of `store`, using `config` for listing
    /// defaults and bounds.
    pub fn new(store: S, config: QueryConfig) -> Self {
        Self { store, config }
    }

    /// Validate `draft` and persist it as a new transaction owned by
    /// `owner`.
    ///
    /// The date defaults to today (UTC) and the category to uncategorized
    /// when the draft omits them.
    ///
    /// # Errors
    /// This function will return a:
    /// - [ValidationError::NonPositiveAmount] if the amount is zero or
    ///   negative,
    /// - [ValidationError::EmptyDescription] if the description is empty,
    /// - or [Error::SqlError] if the store fails.
    pub fn create(&mut self, owner: OwnerId, draft: TransactionDraft) -> Result<Transaction, Error> {
        validate_amount(draft.amount)?;
        validate_description(&draft.description)?;

        let date = draft
            .date
            .unwrap_or_else(|| OffsetDateTime::now_utc().date());
        let builder = Transaction::build(owner, draft.kind, draft.amount)
            .description(&draft.description)
            .category(draft.category)
            .date(date);

        self.store.create(builder)
    }

    /// Retrieve the transaction `id` on behalf of `owner`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a stored transaction,
    /// - [Error::Forbidden] if the transaction belongs to another owner,
    /// - or [Error::SqlError] if the store fails.
    pub fn get(&self, owner: OwnerId, id: TransactionId) -> Result<Transaction, Error> {
        let transaction = self.store.get(id)?;

        if transaction.owner_id != owner {
            return Err(Error::Forbidden);
        }

        Ok(transaction)
    }

    /// Apply `patch` to the transaction `id` on behalf of `owner`.
    ///
    /// Fields absent from the patch keep their stored values. The
    /// transaction's ID and owner can never be changed. Provided fields are
    /// validated exactly as in [TransactionService::create].
    ///
    /// # Errors
    /// Fails the same way as [TransactionService::get], plus the validation
    /// errors of [TransactionService::create] for fields present in the
    /// patch.
    pub fn update(
        &mut self,
        owner: OwnerId,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, Error> {
        self.get(owner, id)?;

        if let Some(amount) = patch.amount {
            validate_amount(amount)?;
        }
        if let Some(description) = &patch.description {
            validate_description(description)?;
        }

        self.store.update(id, &patch)
    }

    /// Delete the transaction `id` on behalf of `owner`.
    ///
    /// The delete is hard: the record is gone, and deleting the same ID a
    /// second time fails with [Error::NotFound] rather than reporting a
    /// silent success.
    ///
    /// # Errors
    /// Fails the same way as [TransactionService::get].
    pub fn delete(&mut self, owner: OwnerId, id: TransactionId) -> Result<(), Error> {
        self.get(owner, id)?;

        self.store.delete(id)
    }

    /// Return one page of `owner`'s transactions, selected and ordered by
    /// `params`.
    ///
    /// A page number past the end of the listing is not an error: the page
    /// comes back empty while `total` and `total_pages` still describe the
    /// whole filtered listing.
    ///
    /// # Errors
    /// This function will return a [ValidationError] wrapped in
    /// [Error::Validation] for an out-of-range page or page size, or
    /// [Error::SqlError] if the store fails.
    pub fn list(
        &self,
        owner: OwnerId,
        params: TransactionListParams,
    ) -> Result<TransactionPage, Error> {
        let resolved = resolve_query(owner, params, &self.config)?;

        let total = self.store.count(&resolved.store_query.filter)?;
        let items = self.store.get_query(resolved.store_query)?;

        Ok(TransactionPage {
            items,
            total,
            total_pages: total.div_ceil(resolved.page_size),
            page: resolved.page,
            page_size: resolved.page_size,
        })
    }

    /// Forecast `owner`'s monthly spending as the average of the monthly
    /// expense totals in the trailing window ending at `now`.
    ///
    /// `now` defaults to today (UTC) and `window_months` to
    /// [DEFAULT_WINDOW_MONTHS]. The window covers
    /// `[now - window_months months, now]`, inclusive on both ends. An empty
    /// window is not an error; see [ForecastResult].
    ///
    /// # Errors
    /// This function will return a [ValidationError::ZeroWindow] if
    /// `window_months` is zero, or [Error::SqlError] if the store fails.
    pub fn sma_forecast(
        &self,
        owner: OwnerId,
        now: Option<Date>,
        window_months: Option<u32>,
    ) -> Result<ForecastResult, Error> {
        let now = now.unwrap_or_else(|| OffsetDateTime::now_utc().date());
        let window_months = window_months.unwrap_or(DEFAULT_WINDOW_MONTHS);
        if window_months == 0 {
            return Err(ValidationError::ZeroWindow.into());
        }

        let start = forecast::months_before(now, window_months);
        let expenses = self.store.get_query(StoreQuery {
            filter: TransactionFilter {
                owner,
                kind: Some(TransactionKind::Expense),
                date_range: Some(start..=now),
                search: None,
            },
            sort_key: SortKey::Date,
            sort_order: SortOrder::Ascending,
            offset: 0,
            limit: None,
        })?;

        Ok(forecast::compute_sma(&expenses, window_months))
    }
}

fn validate_amount(amount: Decimal) -> Result<(), Error> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount.into());
    }

    Ok(())
}

fn validate_description(description: &str) -> Result<(), Error> {
    if description.is_empty() {
        return Err(ValidationError::EmptyDescription.into());
    }

    Ok(())
}
