use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, error, warn};

use crate::repos::{CredentialStore, ScalarLookup, Write};
use crate::services::auth::error::AuthError;
use crate::services::auth::token;

/// How long a token lives and how long after expiry the sweep waits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub ttl_seconds: u64,
    pub sweep_grace_seconds: u64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        // 2 hours each
        Self {
            ttl_seconds: 7_200,
            sweep_grace_seconds: 7_200,
        }
    }
}

/// Result of a successful login.
///
/// `level` is best-effort: a missing stored level does not block issuance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub level: Option<String>,
}

/// Caller identity resolved from a presented token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedToken {
    pub username: String,
    pub access_level: i32,
}

/// Derives, persists, validates and sweeps per-login tokens.
///
/// Holds no mutable state of its own; the credential store serializes
/// concurrent issuance, validation and sweep.
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn CredentialStore>,
    lifetimes: TokenLifetimes,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("store", &self.store.backend_name())
            .field("lifetimes", &self.lifetimes)
            .finish()
    }
}

impl TokenService {
    pub fn new(store: Arc<dyn CredentialStore>, lifetimes: TokenLifetimes) -> Self {
        Self { store, lifetimes }
    }

    /// Issue a token for (username, password hash) and store it with its expiry.
    ///
    /// Overwrites any token the account already had, so at most one is active.
    pub async fn issue_token(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<IssuedToken, AuthError> {
        let account_id = self
            .store
            .lookup_scalar(ScalarLookup::AccountId {
                username,
                password_hash,
            })
            .await?
            .ok_or_else(|| {
                debug!(username, "no account for username/password pair");
                AuthError::InvalidCredentials
            })?;

        let key = token::generate_mac_key()?;
        let token = token::derive_token(&key, username, password_hash, &account_id)?;

        let level = match self
            .store
            .lookup_scalar(ScalarLookup::AccessLevelByUsername { username })
            .await
        {
            Ok(level) => level,
            Err(e) => {
                warn!(username, error = %e, "access level lookup failed; issuing without it");
                None
            }
        };

        let expires_at = seconds(self.lifetimes.ttl_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .ok_or_else(|| {
                error!(ttl_seconds = self.lifetimes.ttl_seconds, "token expiry out of range");
                AuthError::LifetimeOutOfRange
            })?;

        let written = self
            .store
            .execute(Write::StoreToken {
                token: &token,
                username,
                password_hash,
                expires_at,
            })
            .await
            .map_err(|e| {
                error!(username, error = %e, "failed to persist token");
                AuthError::PersistenceFailed
            })?;

        if written == 0 {
            error!(username, "token update matched no account");
            return Err(AuthError::PersistenceFailed);
        }

        debug!(username, expires_at = %expires_at, "issued token");

        Ok(IssuedToken { token, level })
    }

    /// Resolve the caller behind a presented token.
    pub async fn validate_token(&self, presented: &str) -> Result<ValidatedToken, AuthError> {
        let claimed = token::username_of(presented).ok_or(AuthError::MalformedToken)?;

        let stored = self
            .store
            .lookup_scalar(ScalarLookup::UsernameByToken {
                token: presented,
                now: Utc::now(),
            })
            .await?
            .ok_or(AuthError::TokenExpiredOrUnknown)?;

        if stored != claimed {
            warn!(claimed, stored = %stored, "token username mismatch");
            return Err(AuthError::TokenUsernameMismatch);
        }

        // No row here means a newer login replaced the token after the lookup above.
        let raw_level = self
            .store
            .lookup_scalar(ScalarLookup::AccessLevelByToken {
                token: presented,
                username: claimed,
            })
            .await?
            .ok_or_else(|| {
                debug!(username = claimed, "token superseded during validation");
                AuthError::TokenExpiredOrUnknown
            })?;

        let access_level = raw_level.trim().parse::<i32>().map_err(|_| {
            error!(username = claimed, raw_level = %raw_level, "stored access level is not an integer");
            AuthError::MalformedAccessLevel
        })?;

        debug!(username = claimed, access_level, "validated token");

        Ok(ValidatedToken {
            username: stored,
            access_level,
        })
    }

    /// Clear every token whose expiry plus the grace window lies before now.
    pub async fn sweep_expired(&self) -> Result<u64, AuthError> {
        self.sweep_expired_at(Utc::now()).await
    }

    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        // expires_at + grace < now  <=>  expires_at < now - grace
        let cutoff = seconds(self.lifetimes.sweep_grace_seconds)
            .and_then(|grace| now.checked_sub_signed(grace))
            .ok_or_else(|| {
                error!(
                    sweep_grace_seconds = self.lifetimes.sweep_grace_seconds,
                    "sweep cutoff out of range"
                );
                AuthError::LifetimeOutOfRange
            })?;
        let cleared = self.store.execute(Write::ClearExpired { cutoff }).await?;

        debug!(cutoff = %cutoff, cleared, "swept expired tokens");

        Ok(cleared)
    }

    /// Salt the client needs to compute its password hash before logging in.
    pub async fn salt(&self, username: &str) -> Result<String, AuthError> {
        self.store
            .lookup_scalar(ScalarLookup::Salt { username })
            .await?
            .ok_or(AuthError::UnknownAccount)
    }
}

fn seconds(secs: u64) -> Option<TimeDelta> {
    i64::try_from(secs).ok().and_then(TimeDelta::try_seconds)
}
