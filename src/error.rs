//! Defines the engine level error types.

/// The errors that may occur while validating a transaction payload or the
/// parameters of a listing query.
///
/// These errors are recoverable: the caller can correct the offending field
/// and retry the request.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    /// A zero or negative amount was used to create or update a transaction.
    ///
    /// The sign of a transaction is conveyed by its kind, never by the stored
    /// amount, so amounts must always be strictly positive.
    #[error("transaction amounts must be greater than zero")]
    NonPositiveAmount,

    /// An empty string was used as a transaction description.
    #[error("transaction descriptions must not be empty")]
    EmptyDescription,

    /// A listing query asked for page zero.
    ///
    /// Page numbers start at one.
    #[error("page numbers start at 1")]
    ZeroPage,

    /// A listing query asked for a page size of zero or one larger than the
    /// configured maximum.
    #[error("page sizes must be between 1 and {0}")]
    InvalidPageSize(u64),

    /// A forecast was requested over a window of zero months.
    #[error("forecast windows must cover at least one month")]
    ZeroWindow,
}

/// The errors that may occur in the engine.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A transaction payload or query parameter failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested transaction could not be found.
    ///
    /// Callers should check that the ID is correct and that the transaction
    /// has not been deleted. Internally, this error may occur when a query
    /// returns no rows.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// The requested transaction exists but belongs to another owner.
    ///
    /// Reported distinctly from [Error::NotFound] so that the presentation
    /// layer can decide whether to mask the difference from its clients.
    #[error("the requested transaction belongs to another owner")]
    Forbidden,

    /// An unhandled/unexpected SQL error.
    ///
    /// The underlying store failed; fatal for the current request and never
    /// retried by the engine.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
