//! Pocketbook is a transaction ledger and forecasting engine for personal
//! finance applications.
//!
//! The engine records income and expense transactions on behalf of their
//! owners and derives two read models from them: filtered, sorted,
//! paginated listings and a trailing-window simple moving average of
//! monthly spending.
//!
//! Authentication, HTTP routing and rendering are the embedding
//! application's concern. Every operation takes the already-authenticated
//! [OwnerId] explicitly and enforces that owners only ever see or change
//! their own transactions.

#![warn(missing_docs)]

mod config;
mod database_id;
mod db;
mod error;
mod forecast;
mod logging;
pub mod stores;
mod transaction;

pub use config::QueryConfig;
pub use database_id::{OwnerId, TransactionId};
pub use db::{CreateTable, MapRow, initialize};
pub use error::{Error, ValidationError};
pub use forecast::{DEFAULT_WINDOW_MONTHS, ForecastResult};
pub use logging::init_logging;
pub use transaction::{
    Transaction, TransactionBuilder, TransactionDraft, TransactionKind, TransactionListParams,
    TransactionPage, TransactionPatch, TransactionService,
};
