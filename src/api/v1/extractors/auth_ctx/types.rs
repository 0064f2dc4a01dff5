/// Caller attached to a request that passed the access middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthCtx {
    pub username: String,
    pub access_level: i32,
}

impl AuthCtx {
    pub fn new(username: String, access_level: i32) -> Self {
        Self {
            username,
            access_level,
        }
    }
}
