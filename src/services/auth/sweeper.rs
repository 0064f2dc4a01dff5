//! Periodic expired-token sweep.
use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::services::auth::token_service::TokenService;

/// Spawn a background task that sweeps expired tokens every `every`.
///
/// Concurrent runs are harmless: the sweep is a single idempotent update.
/// A failed run is logged and the next tick tries again.
pub fn spawn(tokens: Arc<TokenService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match tokens.sweep_expired().await {
                Ok(0) => {}
                Ok(cleared) => info!(cleared, "cleared expired tokens"),
                Err(e) => error!(error = %e, "expired token sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::memory_store::{AccountRecord, MemoryCredentialStore};
    use crate::services::auth::token_service::TokenLifetimes;
    use chrono::{Duration as ChronoDuration, Utc};

    #[tokio::test]
    async fn background_sweep_clears_stale_token() {
        let store = Arc::new(MemoryCredentialStore::new());
        let mut stale = AccountRecord::fixture(1, "stale", "1");
        stale.token = Some("stale:aa".into());
        stale.expires_at = Some(Utc::now() - ChronoDuration::hours(5));
        store.insert_account(stale).await;

        let tokens = Arc::new(TokenService::new(store.clone(), TokenLifetimes::default()));
        let handle = spawn(tokens, Duration::from_millis(10));

        // First tick fires immediately.
        for _ in 0..50 {
            if store.account("stale").await.unwrap().token.is_none() {
                break;
            }
            time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        let row = store.account("stale").await.unwrap();
        assert!(row.token.is_none());
        assert!(row.expires_at.is_none());
    }
}
