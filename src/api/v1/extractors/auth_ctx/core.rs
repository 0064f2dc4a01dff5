use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;

use super::AuthCtx;

/// Caller identity for handlers behind the access middleware.
pub struct AuthCtxExtractor(pub AuthCtx);

impl FromRequestParts<AppState> for AuthCtxExtractor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Absent only when a route was mounted without the access middleware.
        match parts.extensions.get::<AuthCtx>() {
            Some(ctx) => Ok(AuthCtxExtractor(ctx.clone())),
            None => {
                tracing::warn!(path = %parts.uri.path(), "no auth context on request");
                Err(AppError::unauthorized("Authentication required."))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::repos::MemoryCredentialStore;
    use crate::services::auth::{TokenLifetimes, TokenService};

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> String {
        format!("{}:{}", ctx.username, ctx.access_level)
    }

    fn state() -> AppState {
        let store = Arc::new(MemoryCredentialStore::new());
        let tokens = Arc::new(TokenService::new(store.clone(), TokenLifetimes::default()));
        AppState::new(store, tokens)
    }

    #[tokio::test]
    async fn unguarded_route_rejects_with_json_401() {
        let app = Router::new().route("/me", get(whoami)).with_state(state());

        let res = app
            .oneshot(Request::get("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
        assert_eq!(body["error"]["message"], "Authentication required.");
    }

    #[tokio::test]
    async fn context_in_extensions_reaches_handler() {
        let app = Router::new().route("/me", get(whoami)).with_state(state());

        let mut req = Request::get("/me").body(Body::empty()).unwrap();
        req.extensions_mut().insert(AuthCtx {
            username: "alice".into(),
            access_level: 2,
        });
        let res = app.oneshot(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let bytes = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"alice:2");
    }
}
