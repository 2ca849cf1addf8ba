//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Mount a built URL table onto an Axum Router
//! - Buffer request bodies and attach the route match
//! - Wire up middleware (tracing, timeout, request ID)
//! - Answer errors no exception handler translated with a bare 500
//! - Record request metrics
//! - Serve with graceful shutdown

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::RawPathParams;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::error::MountError;
use crate::http::response::JsonResponse;
use crate::observability::metrics;
use crate::routing::{Dispatcher, ResolverMatch, UrlPatterns};

/// HTTP server for a built URL table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(urls: Arc<UrlPatterns>, config: ServerConfig) -> Result<Self, MountError> {
        let router = Self::build_router(&urls, &config)?;
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(urls: &UrlPatterns, config: &ServerConfig) -> Result<Router, MountError> {
        let router = mount(urls, config.max_body_bytes)?.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs,
                ))),
        );
        Ok(router)
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt::oneshot`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves, then drain in-flight requests.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A resolved route as the host serves it.
struct Mounted {
    path: String,
    name: Option<String>,
    dispatcher: Dispatcher,
}

/// Mount every route of `urls` on a bare Axum router (no layers).
///
/// A path resolved twice keeps its first binding. Paths are checked against
/// the matcher Axum uses before mounting, so a table Axum would refuse comes
/// back as a [`MountError`].
pub fn mount(urls: &UrlPatterns, max_body_bytes: usize) -> Result<Router, MountError> {
    let mut router = Router::new();
    let mut matcher = matchit::Router::new();
    let mut seen: Vec<String> = Vec::new();

    for resolved in urls.resolve() {
        if seen.contains(&resolved.path) {
            tracing::warn!(path = %resolved.path, "Duplicate path, keeping the first route");
            continue;
        }
        check_segments(&resolved.path)?;
        matcher
            .insert(resolved.path.as_str(), ())
            .map_err(|err| MountError::Conflict {
                path: resolved.path.clone(),
                reason: err.to_string(),
            })?;
        seen.push(resolved.path.clone());

        tracing::debug!(
            path = %resolved.path,
            name = resolved.name.as_deref().unwrap_or_default(),
            methods = ?resolved.dispatcher.allowed_methods(),
            "Mounting route"
        );

        let mounted = Arc::new(Mounted {
            path: resolved.path.clone(),
            name: resolved.name,
            dispatcher: resolved.dispatcher,
        });
        router = router.route(
            &resolved.path,
            any(
                move |params: Result<RawPathParams, RawPathParamsRejection>,
                      request: axum::extract::Request| {
                    let mounted = mounted.clone();
                    let params = params
                        .map(|params| {
                            params
                                .iter()
                                .map(|(key, value)| (key.to_string(), value.to_string()))
                                .collect()
                        })
                        .unwrap_or_default();
                    async move { serve_route(mounted, params, request, max_body_bytes).await }
                },
            ),
        );
    }

    tracing::info!(routes = seen.len(), "Mounted URL table");
    Ok(router.fallback(not_found))
}

/// Axum 0.8 rejects the pre-0.8 `:name` and `*name` segment syntax.
fn check_segments(path: &str) -> Result<(), MountError> {
    match path
        .split('/')
        .find(|segment| segment.starts_with(':') || segment.starts_with('*'))
    {
        Some(segment) => Err(MountError::InvalidSegment {
            path: path.to_string(),
            segment: segment.to_string(),
        }),
        None => Ok(()),
    }
}

async fn serve_route(
    mounted: Arc<Mounted>,
    params: Vec<(String, String)>,
    request: axum::extract::Request,
    max_body_bytes: usize,
) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();

    let (mut parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, max_body_bytes).await {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(path = %mounted.path, error = %err, "Failed to buffer request body");
            metrics::record_request(&method, 413, &mounted.path, start);
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    parts.extensions.insert(ResolverMatch {
        route: mounted.path.clone(),
        url_name: mounted.name.clone(),
        params,
    });

    // Handlers are synchronous; keep them off the async workers so the
    // timeout layer can still fire.
    let dispatcher = mounted.dispatcher.clone();
    let raw = axum::http::Request::from_parts(parts, body);
    let response = match tokio::task::spawn_blocking(move || dispatcher.call(raw)).await {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => unhandled(&method, &mounted.path, &err),
        Err(err) => unhandled(&method, &mounted.path, &err),
    };

    metrics::record_request(&method, response.status().as_u16(), &mounted.path, start);
    response
}

/// Log and count an error nothing translated, and answer it with a bare 500.
fn unhandled(method: &str, route: &str, error: &dyn std::fmt::Display) -> Response {
    tracing::error!(
        method = %method,
        route = %route,
        error = %error,
        "Unhandled error in route handler"
    );
    metrics::record_unhandled(route);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

async fn not_found() -> Response {
    JsonResponse::new(json!({ "detail": "Not Found" }))
        .status(StatusCode::NOT_FOUND)
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use metrics_exporter_prometheus::PrometheusBuilder;

    #[test]
    fn test_check_segments() {
        assert!(check_segments("/items/{id}/").is_ok());
        assert!(check_segments("/files/{*rest}").is_ok());
        assert_eq!(
            check_segments("/users/:id"),
            Err(MountError::InvalidSegment {
                path: "/users/:id".into(),
                segment: ":id".into(),
            })
        );
        assert!(check_segments("/static/*rest").is_err());
    }

    #[test]
    fn test_unhandled_is_counted() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        let response = ::metrics::with_local_recorder(&recorder, || {
            unhandled("GET", "/boom", &"Unknown error")
        });

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let rendered = handle.render();
        assert!(
            rendered.contains(r#"apirouter_unhandled_errors_total{route="/boom"} 1"#),
            "{rendered}"
        );
    }
}
