//! In-process credential store.
//!
//! Backs development runs without `DATABASE_URL` and the unit tests. A single
//! `RwLock` around the table gives each lookup a consistent view of a row.
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::repos::credential_store::{
    AccountSummary, CredentialStore, RowLookup, ScalarLookup, Write,
};
use crate::repos::error::StoreResult;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    // Kept as text so tests can plant values that do not parse.
    pub access_level: Option<String>,
    pub token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    // keyed by username
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl AccountRecord {
    /// Account whose password hash and salt are derived from the username.
    pub fn fixture(id: i64, username: &str, level: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            password_hash: format!("{username}-hash"),
            salt: format!("{username}-salt"),
            access_level: Some(level.to_string()),
            token: None,
            expires_at: None,
        }
    }
}

#[cfg(test)]
impl MemoryCredentialStore {
    pub async fn insert_account(&self, record: AccountRecord) {
        self.accounts
            .write()
            .await
            .insert(record.username.clone(), record);
    }

    pub async fn account(&self, username: &str) -> Option<AccountRecord> {
        self.accounts.read().await.get(username).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn lookup_scalar(&self, lookup: ScalarLookup<'_>) -> StoreResult<Option<String>> {
        let accounts = self.accounts.read().await;

        let value = match lookup {
            ScalarLookup::AccountId {
                username,
                password_hash,
            } => accounts
                .get(username)
                .filter(|a| a.password_hash == password_hash)
                .map(|a| a.id.to_string()),
            ScalarLookup::Salt { username } => accounts.get(username).map(|a| a.salt.clone()),
            ScalarLookup::AccessLevelByUsername { username } => accounts
                .get(username)
                .and_then(|a| a.access_level.clone()),
            ScalarLookup::UsernameByToken { token, now } => accounts
                .values()
                .find(|a| {
                    a.token.as_deref() == Some(token) && a.expires_at.is_some_and(|at| at >= now)
                })
                .map(|a| a.username.clone()),
            ScalarLookup::AccessLevelByToken { token, username } => accounts
                .get(username)
                .filter(|a| a.token.as_deref() == Some(token))
                .map(|a| a.access_level.clone().unwrap_or_default()),
        };

        Ok(value)
    }

    async fn lookup_row(&self, lookup: RowLookup<'_>) -> StoreResult<Option<AccountSummary>> {
        let accounts = self.accounts.read().await;

        let row = match lookup {
            RowLookup::AccountByUsername { username } => {
                accounts.get(username).map(|a| AccountSummary {
                    id: a.id,
                    username: a.username.clone(),
                    access_level: a.access_level.as_deref().and_then(|l| l.parse().ok()),
                })
            }
        };

        Ok(row)
    }

    async fn execute(&self, write: Write<'_>) -> StoreResult<u64> {
        let mut accounts = self.accounts.write().await;

        let affected = match write {
            Write::StoreToken {
                token,
                username,
                password_hash,
                expires_at,
            } => match accounts
                .get_mut(username)
                .filter(|a| a.password_hash == password_hash)
            {
                Some(account) => {
                    account.token = Some(token.to_string());
                    account.expires_at = Some(expires_at);
                    1
                }
                None => 0,
            },
            Write::ClearExpired { cutoff } => {
                let mut cleared = 0;
                for account in accounts.values_mut() {
                    if account.expires_at.is_some_and(|at| at < cutoff) {
                        account.token = None;
                        account.expires_at = None;
                        cleared += 1;
                    }
                }
                cleared
            }
        };

        Ok(affected)
    }
}
