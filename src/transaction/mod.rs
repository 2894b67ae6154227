//! Transaction management for the engine.
//!
//! This module contains everything related to transactions:
//! - The [Transaction] model, the payloads for creating one and the patch
//!   type for partially updating one
//! - The [TransactionService] that validates payloads, enforces the
//!   ownership boundary and orchestrates store calls
//! - The listing parameters and page types that slice a user's
//!   transactions into bounded, ordered pages

mod model;
pub(crate) mod query;
mod service;

pub use model::{
    Transaction, TransactionBuilder, TransactionDraft, TransactionKind, TransactionPatch,
};
pub use query::{TransactionListParams, TransactionPage};
pub use service::TransactionService;
