//! Token check + level-based authorization for per-user resources.
//!
//! Routes behind this layer carry a `{user}` path segment naming the resource
//! owner. Level 1 callers may only reach their own resources; levels 2 and 3
//! reach everything; any other level is rejected.

use axum::{
    RequestExt, Router,
    body::Body,
    extract::{RawPathParams, State},
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};
use tracing::{debug, warn};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::state::AppState;

pub const OWNER_PARAM: &str = "user";

const WRONG_CREDENTIALS: &str = "Wrong credentials sent.";
const NOT_OWNER: &str = "You don't have the authority to access that resource.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    AllowedSelf,
    AllowedElevated,
    RejectedNotOwner,
    RejectedUnknownLevel,
}

pub fn authorize(access_level: i32, token_user: &str, path_owner: Option<&str>) -> AccessDecision {
    match access_level {
        1 if path_owner == Some(token_user) => AccessDecision::AllowedSelf,
        1 => AccessDecision::RejectedNotOwner,
        2 | 3 => AccessDecision::AllowedElevated,
        _ => AccessDecision::RejectedUnknownLevel,
    }
}

/// Put the access check in front of every route already on `router`.
///
/// Uses `route_layer` so the path is matched (and `{user}` extracted) first.
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.route_layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = presented_token(req.headers())
        .ok_or_else(|| AppError::unauthorized(WRONG_CREDENTIALS))?
        .to_string();

    let caller = match state.tokens.validate_token(&token).await {
        Ok(caller) => caller,
        Err(err) => {
            warn!(error = %err, "token validation failed");
            return Err(AppError::unauthorized(WRONG_CREDENTIALS));
        }
    };

    let owner = path_owner(&mut req).await;

    // validate_token already pinned caller.username to the name embedded in the token.
    match authorize(caller.access_level, &caller.username, owner.as_deref()) {
        AccessDecision::AllowedSelf | AccessDecision::AllowedElevated => {
            req.extensions_mut()
                .insert(AuthCtx::new(caller.username, caller.access_level));
            Ok(next.run(req).await)
        }
        AccessDecision::RejectedNotOwner => {
            debug!(
                username = %caller.username,
                owner = ?owner,
                "level 1 caller requested someone else's resource"
            );
            Err(AppError::unauthorized(NOT_OWNER))
        }
        AccessDecision::RejectedUnknownLevel => {
            warn!(
                username = %caller.username,
                access_level = caller.access_level,
                "unrecognized access level"
            );
            Err(AppError::unauthorized(WRONG_CREDENTIALS))
        }
    }
}

// Raw token; a `Bearer ` prefix is tolerated.
fn presented_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?.trim();
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    (!token.is_empty()).then_some(token)
}

async fn path_owner(req: &mut Request<Body>) -> Option<String> {
    let params = req.extract_parts::<RawPathParams>().await.ok()?;
    params
        .iter()
        .find(|(key, _)| *key == OWNER_PARAM)
        .map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::get;
    use tower::ServiceExt;

    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::repos::memory_store::{AccountRecord, MemoryCredentialStore};
    use crate::services::auth::{TokenLifetimes, TokenService};

    #[test]
    fn decision_table() {
        assert_eq!(authorize(1, "alice", Some("alice")), AccessDecision::AllowedSelf);
        assert_eq!(authorize(1, "alice", Some("bob")), AccessDecision::RejectedNotOwner);
        assert_eq!(authorize(1, "alice", None), AccessDecision::RejectedNotOwner);
        assert_eq!(authorize(2, "staff", Some("bob")), AccessDecision::AllowedElevated);
        assert_eq!(authorize(3, "admin", None), AccessDecision::AllowedElevated);
        assert_eq!(authorize(0, "alice", Some("alice")), AccessDecision::RejectedUnknownLevel);
        assert_eq!(authorize(4, "alice", Some("alice")), AccessDecision::RejectedUnknownLevel);
        assert_eq!(authorize(-1, "alice", Some("alice")), AccessDecision::RejectedUnknownLevel);
    }

    #[test]
    fn bearer_prefix_is_optional() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "alice:abc".parse().unwrap());
        assert_eq!(presented_token(&headers), Some("alice:abc"));

        headers.insert(header::AUTHORIZATION, "Bearer alice:abc".parse().unwrap());
        assert_eq!(presented_token(&headers), Some("alice:abc"));

        headers.insert(header::AUTHORIZATION, "  ".parse().unwrap());
        assert_eq!(presented_token(&headers), None);
    }

    async fn echo_caller(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        format!("{}:{}", ctx.username, ctx.access_level)
    }

    async fn setup() -> (Router, Arc<TokenService>) {
        let store = Arc::new(MemoryCredentialStore::new());
        store
            .insert_account(AccountRecord::fixture(1, "alice", "1"))
            .await;
        store
            .insert_account(AccountRecord::fixture(2, "bob", "1"))
            .await;
        store
            .insert_account(AccountRecord::fixture(3, "admin", "3"))
            .await;
        store
            .insert_account(AccountRecord::fixture(4, "ghost", "0"))
            .await;

        let tokens = Arc::new(TokenService::new(store.clone(), TokenLifetimes::default()));
        let state = AppState::new(store, tokens.clone());

        let router = Router::new().route("/students/{user}", get(echo_caller));
        let router = apply(router, state.clone()).with_state(state);
        (router, tokens)
    }

    async fn call(router: &Router, path: &str, token: Option<&str>) -> (StatusCode, String) {
        let mut req = Request::builder().uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, token);
        }
        let res = router
            .clone()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = http_body_util::BodyExt::collect(res.into_body())
            .await
            .unwrap()
            .to_bytes();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn self_scope_caller_reaches_only_own_path() {
        let (router, tokens) = setup().await;
        let alice = tokens.issue_token("alice", "alice-hash").await.unwrap().token;

        let (status, body) = call(&router, "/students/alice", Some(alice.as_str())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "alice:1");

        let (status, body) = call(&router, "/students/bob", Some(alice.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(NOT_OWNER));
    }

    #[tokio::test]
    async fn elevated_caller_reaches_any_path() {
        let (router, tokens) = setup().await;
        let admin = tokens.issue_token("admin", "admin-hash").await.unwrap().token;

        for path in ["/students/alice", "/students/bob", "/students/admin"] {
            let bearer = format!("Bearer {admin}");
            let (status, body) = call(&router, path, Some(bearer.as_str())).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body, "admin:3");
        }
    }

    #[tokio::test]
    async fn unknown_level_is_rejected() {
        let (router, tokens) = setup().await;
        let ghost = tokens.issue_token("ghost", "ghost-hash").await.unwrap().token;

        let (status, _) = call(&router, "/students/ghost", Some(ghost.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn missing_malformed_or_stale_token_is_rejected() {
        let (router, tokens) = setup().await;

        let (status, _) = call(&router, "/students/alice", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(&router, "/students/alice", Some("no-separator")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let first = tokens.issue_token("alice", "alice-hash").await.unwrap().token;
        tokens.issue_token("alice", "alice-hash").await.unwrap();
        let (status, body) = call(&router, "/students/alice", Some(first.as_str())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(WRONG_CREDENTIALS));
    }
}
