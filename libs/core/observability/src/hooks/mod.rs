//! Request instrumentation.
//!
//! [`instrument`] wraps request handling in an ordered list of
//! [`RequestHook`]s. Each hook sees the request metadata before the handler
//! runs, then the elapsed time and the terminal [`Outcome`] afterwards. Hooks
//! observe only: the response leaves the middleware unchanged.

mod logging;
mod performance;
mod request_metrics;

pub use logging::LoggingHook;
pub use performance::PerformanceHook;
pub use request_metrics::{MetricsHook, UNMATCHED_ROUTE};

use axum::{
    body::{Body, Bytes, to_bytes},
    extract::{ConnectInfo, MatchedPath, Query, Request, State},
    http::{HeaderMap, Method, StatusCode, header},
    middleware::Next,
    response::Response,
};
use futures::stream;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bodies larger than this are forwarded without being captured for logs.
pub const MAX_CAPTURED_BODY: usize = 2 * 1024 * 1024;

/// What the pipeline knows about a request, captured once on arrival.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestMeta {
    pub request_id: Option<String>,
    pub method: Method,
    /// Path plus query string, as received.
    pub url: String,
    pub path: String,
    /// Route template that matched, e.g. `/api/users/{id}`. `None` when no route matched.
    pub route: Option<String>,
    pub query: Map<String, Value>,
    /// Parsed JSON body, `Null` when absent, not JSON, or too large to capture.
    pub body: Value,
    pub user_agent: Option<String>,
    pub ip: Option<String>,
}

impl RequestMeta {
    /// Metadata for a request without reading its body.
    pub fn from_parts(
        method: &Method,
        uri: &axum::http::Uri,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Self {
        let header_str = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let query = Query::<BTreeMap<String, String>>::try_from_uri(uri)
            .map(|Query(pairs)| {
                pairs
                    .into_iter()
                    .map(|(k, v)| (k, Value::String(v)))
                    .collect()
            })
            .unwrap_or_default();

        let ip = header_str("x-forwarded-for")
            .and_then(|forwarded| forwarded.split(',').next().map(|ip| ip.trim().to_string()))
            .filter(|ip| !ip.is_empty())
            .or_else(|| peer.map(|addr| addr.ip().to_string()));

        Self {
            request_id: header_str(REQUEST_ID_HEADER),
            method: method.clone(),
            url: uri
                .path_and_query()
                .map(|pq| pq.as_str().to_string())
                .unwrap_or_else(|| uri.path().to_string()),
            path: uri.path().to_string(),
            route: None,
            query,
            body: Value::Null,
            user_agent: header_str(header::USER_AGENT.as_str()),
            ip,
        }
    }
}

/// How a request ended.
#[derive(Clone, Copy, Debug)]
pub enum Outcome<'a> {
    Success { status: StatusCode },
    Failure(&'a FailureReport),
}

impl Outcome<'_> {
    pub fn status(&self) -> StatusCode {
        match self {
            Outcome::Success { status } => *status,
            Outcome::Failure(report) => report.status,
        }
    }
}

/// Attached to a response extension by the exception filter when handling failed.
///
/// `message` is the underlying failure's own message, which may differ from
/// what the client was shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailureReport {
    pub status: StatusCode,
    pub kind: String,
    pub message: String,
    pub trace: Option<String>,
}

pub trait RequestHook: Send + Sync {
    fn before(&self, _meta: &RequestMeta) {}

    fn after(&self, meta: &RequestMeta, elapsed: Duration, outcome: &Outcome<'_>);
}

/// Ordered hook list shared by every request.
#[derive(Clone, Default)]
pub struct HookPipeline {
    hooks: Arc<Vec<Arc<dyn RequestHook>>>,
}

impl HookPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a hook. Hooks run in insertion order.
    pub fn with(mut self, hook: impl RequestHook + 'static) -> Self {
        Arc::make_mut(&mut self.hooks).push(Arc::new(hook));
        self
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    pub fn before(&self, meta: &RequestMeta) {
        for hook in self.hooks.iter() {
            hook.before(meta);
        }
    }

    pub fn after(&self, meta: &RequestMeta, elapsed: Duration, outcome: &Outcome<'_>) {
        for hook in self.hooks.iter() {
            hook.after(meta, elapsed, outcome);
        }
    }
}

/// Middleware running the hook pipeline around the rest of the stack.
///
/// The captured [`RequestMeta`] is stored as `Arc<RequestMeta>` in the request
/// extensions for inner layers.
pub async fn instrument(
    State(pipeline): State<HookPipeline>,
    request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let (request, meta) = capture(request).await;
    let meta = Arc::new(meta);

    pipeline.before(&meta);

    let mut request = request;
    request.extensions_mut().insert(Arc::clone(&meta));
    let response = next.run(request).await;

    let elapsed = started.elapsed();
    let outcome = match response.extensions().get::<FailureReport>() {
        Some(report) => Outcome::Failure(report),
        None => Outcome::Success {
            status: response.status(),
        },
    };
    pipeline.after(&meta, elapsed, &outcome);

    response
}

/// Read request metadata and, when its declared length allows, the JSON body.
/// The body is put back so handlers see the original bytes. A body that fails
/// to buffer is replaced by one yielding the same error, so extractors reject it.
async fn capture(request: Request) -> (Request, RequestMeta) {
    let (parts, body) = request.into_parts();
    let peer = parts
        .extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let mut meta = RequestMeta::from_parts(&parts.method, &parts.uri, &parts.headers, peer);
    meta.route = parts
        .extensions
        .get::<MatchedPath>()
        .map(|matched| matched.as_str().to_string());

    let declared_len = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());

    let body = match declared_len {
        Some(len) if len > 0 && len <= MAX_CAPTURED_BODY => {
            match to_bytes(body, MAX_CAPTURED_BODY).await {
                Ok(bytes) => {
                    meta.body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
                    Body::from(bytes)
                }
                Err(e) => {
                    tracing::warn!(context = "HTTP", error = %e, "Failed to buffer request body");
                    Body::from_stream(stream::once(async move { Err::<Bytes, _>(e) }))
                }
            }
        }
        _ => body,
    };

    (Request::from_parts(parts, body), meta)
}
