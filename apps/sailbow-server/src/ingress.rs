//! HTTP ingress: health, OpenAPI and the shared middleware stack.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderName, Request},
    middleware::{from_fn, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use runtime::ServerConfig;
use serde_json::{json, Value};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::field::Empty;
use utoipa::OpenApi;

pub fn request_id_header() -> HeaderName {
    HeaderName::from_static("x-request-id")
}

#[derive(Clone, Default)]
pub struct MakeReqId;

impl MakeRequestId for MakeReqId {
    fn make_request_id<B>(&mut self, _req: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().simple().to_string();
        Some(RequestId::new(id.parse().ok()?))
    }
}

#[derive(Clone, Debug)]
pub struct XRequestId(pub String);

/// Store the request id in extensions and record it on the current span.
async fn push_req_id_to_extensions(mut req: Request<Body>, next: Next) -> Response {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| "n/a".to_string());

    req.extensions_mut().insert(XRequestId(rid.clone()));
    tracing::Span::current().record("request_id", tracing::field::display(&rid));

    next.run(req).await
}

fn make_span(req: &Request<Body>) -> tracing::Span {
    let rid = req
        .headers()
        .get(request_id_header())
        .and_then(|v| v.to_str().ok())
        .unwrap_or("n/a");
    tracing::info_span!(
        "http_request",
        method = %req.method(),
        uri = %req.uri().path(),
        version = ?req.version(),
        request_id = %rid,
        status = Empty,
        latency_ms = Empty
    )
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(boats::api::rest::openapi::BoatsApiDoc::openapi())
}

/// Build the public router around the module routes.
///
/// Layers, outermost first: PropagateRequestId, SetRequestId,
/// push_req_id_to_extensions, Trace, Timeout, CORS, BodyLimit.
pub fn build_router(modules: Router, server: &ServerConfig) -> Router {
    let x_request_id = request_id_header();

    let mut router = Router::new()
        .route("/health", get(health_check))
        .route("/openapi.json", get(openapi_json))
        .merge(modules);

    router = router.layer(RequestBodyLimitLayer::new(server.body_limit_bytes));
    if server.cors_enabled {
        router = router.layer(CorsLayer::permissive());
    }
    router = router.layer(TimeoutLayer::new(timeout_or_default(server.request_timeout)));
    router = router.layer(TraceLayer::new_for_http().make_span_with(make_span));
    router = router.layer(from_fn(push_req_id_to_extensions));
    router = router.layer(SetRequestIdLayer::new(x_request_id.clone(), MakeReqId));
    router.layer(PropagateRequestIdLayer::new(x_request_id))
}

fn timeout_or_default(timeout: Duration) -> Duration {
    if timeout.is_zero() {
        Duration::from_secs(30)
    } else {
        timeout
    }
}
