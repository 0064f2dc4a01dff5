//! Credential store interface used by the token service.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::repos::error::StoreResult;

/// Keyed single-value lookups against the account table.
///
/// Each variant maps to exactly one parameterized query in a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarLookup<'a> {
    /// Account id for matching (username, password hash).
    AccountId {
        username: &'a str,
        password_hash: &'a str,
    },
    Salt {
        username: &'a str,
    },
    AccessLevelByUsername {
        username: &'a str,
    },
    /// Username owning exactly this token value, if it has not expired at `now`.
    UsernameByToken {
        token: &'a str,
        now: DateTime<Utc>,
    },
    /// Level of the row holding (token, username).
    ///
    /// `None` when no row holds the token any more; `Some("")` when the row
    /// exists but its level is null.
    AccessLevelByToken {
        token: &'a str,
        username: &'a str,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLookup<'a> {
    AccountByUsername { username: &'a str },
}

/// Parameterized write statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write<'a> {
    /// Overwrite the account's token and expiry, keyed on (username, password hash).
    StoreToken {
        token: &'a str,
        username: &'a str,
        password_hash: &'a str,
        expires_at: DateTime<Utc>,
    },
    /// Null out token and expiry on every row with `expires_at < cutoff`.
    ClearExpired { cutoff: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct AccountSummary {
    pub id: i64,
    pub username: String,
    pub access_level: Option<i32>,
}

/// A minimal store interface.
///
/// - `Ok(None)` is the "no rows" signal.
/// - `Err(_)` is a backend failure; callers surface it without retrying.
/// - `execute` returns the number of affected rows.
///
/// Reads of a single row must observe a consistent snapshot of it.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn lookup_scalar(&self, lookup: ScalarLookup<'_>) -> StoreResult<Option<String>>;

    async fn lookup_row(&self, lookup: RowLookup<'_>) -> StoreResult<Option<AccountSummary>>;

    async fn execute(&self, write: Write<'_>) -> StoreResult<u64>;
}
