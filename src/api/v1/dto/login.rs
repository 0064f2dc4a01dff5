use serde::{Deserialize, Serialize};

/// Request body for `/token`.
///
/// `password_hash` is the client-side hash computed from the account salt;
/// the server compares it verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Stored access level as text; empty when the account has none.
    pub level: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaltResponse {
    pub salt: String,
}
