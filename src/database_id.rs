//! ID types for transactions and their owners.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Alias for the integer type used for mapping to database IDs.
pub type TransactionId = i64;

/// A newtype wrapper for integer owner IDs.
///
/// Owners are the users transactions belong to, identified by an opaque
/// integer that the identity layer hands to the engine with every request.
/// Wrapping the integer disambiguates owner IDs from transaction IDs,
/// leading to better compile time errors when the two are mixed up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(i64);

impl OwnerId {
    /// Create a new owner ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the owner ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
