//! Shared utilities for integration tests.

#![allow(dead_code)]

use apirouter::http::server::mount;
use apirouter::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use tower::ServiceExt;

/// Body limit used by [`app`].
pub const BODY_LIMIT: usize = 1024 * 1024;

/// Mount `router` with no outer layers.
pub fn app(router: &Router) -> axum::Router {
    mount(&router.urls(), BODY_LIMIT).unwrap()
}

pub async fn send(app: &axum::Router, method: Method, uri: &str) -> Response {
    send_body(app, method, uri, None, Body::empty()).await
}

pub async fn send_body(
    app: &axum::Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: impl Into<Body>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.clone()
        .oneshot(builder.body(body.into()).unwrap())
        .await
        .unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Status and body of one call.
pub async fn call(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = send(app, method, uri).await;
    let status = response.status();
    (status, body_bytes(response).await)
}
