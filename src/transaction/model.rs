//! Defines the core data types for transactions.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use time::{Date, OffsetDateTime};

use crate::database_id::{OwnerId, TransactionId};

/// Whether a transaction records money earned or money spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Money flowing in, e.g. a salary deposit.
    Income,
    /// Money flowing out, e.g. a grocery purchase.
    Expense,
}

impl TransactionKind {
    /// The canonical text form of the kind, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

/// An expense or income, i.e. an event where money was either spent or
/// earned.
///
/// The amount is always strictly positive; the direction of the money flow
/// is conveyed by [Transaction::kind]. Amounts use decimal arithmetic so
/// that currency values round-trip without binary float drift.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the owner that created this transaction.
    pub owner_id: OwnerId,
    /// Whether this transaction is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned in this transaction.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// An optional label that groups related transactions. `None` means
    /// uncategorized.
    pub category: Option<String>,
    /// The date the transaction occurred, at day granularity.
    pub date: Date,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(owner_id: OwnerId, kind: TransactionKind, amount: Decimal) -> TransactionBuilder {
        TransactionBuilder {
            owner_id,
            kind,
            amount,
            description: String::new(),
            category: None,
            date: OffsetDateTime::now_utc().date(),
        }
    }
}

/// A transaction that has been validated but not yet stored.
///
/// Finalized by
/// [TransactionStore::create](crate::stores::TransactionStore::create),
/// which assigns the ID.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionBuilder {
    /// The ID of the owner the transaction will belong to.
    pub owner_id: OwnerId,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned.
    pub amount: Decimal,
    /// A text description of what the transaction was for.
    pub description: String,
    /// An optional label that groups related transactions.
    pub category: Option<String>,
    /// The date the transaction occurred. Defaults to today (UTC).
    pub date: Date,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_owned();
        self
    }

    /// Set the category for the transaction.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    /// Set the date for the transaction.
    pub fn date(mut self, date: Date) -> Self {
        self.date = date;
        self
    }
}

/// The payload for creating a transaction.
///
/// `kind`, `amount` and `description` are required; `category` defaults to
/// uncategorized and `date` to today (UTC) when omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or earned. Must be greater than zero.
    pub amount: Decimal,
    /// A text description of what the transaction was for. Must not be
    /// empty.
    pub description: String,
    /// An optional label that groups related transactions.
    #[serde(default)]
    pub category: Option<String>,
    /// The date the transaction occurred.
    #[serde(default)]
    pub date: Option<Date>,
}

/// The payload for partially updating a transaction.
///
/// Each field is only written when it is present in the patch; absent fields
/// keep their stored values. The transaction's ID and owner are not part of
/// the patch and can never be changed through an update, even if a client
/// includes them in a request body.
///
/// `category` distinguishes "absent" from "explicitly null": a payload that
/// omits the field leaves the category alone, while `"category": null`
/// clears it back to uncategorized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionPatch {
    /// Replace the transaction kind.
    #[serde(default)]
    pub kind: Option<TransactionKind>,
    /// Replace the amount. Must be greater than zero.
    #[serde(default)]
    pub amount: Option<Decimal>,
    /// Replace the description. Must not be empty.
    #[serde(default)]
    pub description: Option<String>,
    /// Replace (`Some(Some(_))`) or clear (`Some(None)`) the category.
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category: Option<Option<String>>,
    /// Replace the date the transaction occurred.
    #[serde(default)]
    pub date: Option<Date>,
}

impl TransactionPatch {
    /// Whether the patch would change any field.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }
}

/// Deserializes a field that was present in the payload as `Some`, keeping
/// `null` distinguishable from an omitted field (which falls back to the
/// `None` default).
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
