/*
 * Responsibility
 * - 全ルート共通の HTTP レイヤ
 *   - X-Request-Id の採番と伝搬
 *   - TraceLayer によるアクセスログ
 *   - ボディサイズ上限 / リクエストタイムアウト (Config から注入)
 */
use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, header::HeaderName};
use tower::timeout::TimeoutLayer;
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Transport limits shared by every route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HttpLimits {
    pub body_limit_bytes: usize,
    pub request_timeout: Duration,
}

impl Default for HttpLimits {
    fn default() -> Self {
        // Login bodies are a username and a hex hash; each request is a few store round trips.
        Self {
            body_limit_bytes: 16 * 1024,
            request_timeout: Duration::from_secs(10),
        }
    }
}

async fn map_layer_error(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request timed out");
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

pub fn apply(router: Router, limits: HttpLimits) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
            .layer(PropagateRequestIdLayer::new(request_id))
            .layer(TraceLayer::new_for_http())
            .layer(HandleErrorLayer::new(map_layer_error))
            .layer(TimeoutLayer::new(limits.request_timeout))
            .layer(RequestBodyLimitLayer::new(limits.body_limit_bytes)),
    )
}
