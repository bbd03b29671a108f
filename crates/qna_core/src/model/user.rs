//! User identity used for ownership checks.

use serde::{Deserialize, Serialize};

/// Storage identity of a user row.
pub type UserId = i64;

/// Account identity attached to questions and answers as their writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique login name.
    pub login: String,
    pub name: String,
    pub email: Option<String>,
}

impl User {
    /// Returns whether `other` is the same account.
    ///
    /// Only the storage id takes part; display fields may drift.
    pub fn is_same(&self, other: &User) -> bool {
        self.id == other.id
    }
}
