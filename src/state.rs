/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - store: Arc<dyn CredentialStore>, tokens: Arc<TokenService>
 * - Clone 前提で持つ (内部は Arc)
 */
use std::sync::Arc;

use crate::repos::CredentialStore;
use crate::services::auth::TokenService;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self { store, tokens }
    }
}
