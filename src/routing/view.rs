//! Class-style handlers: one object answering several methods.
//!
//! # Responsibilities
//! - Declare which methods a view implements
//! - Derive the allowed set (`HEAD` via `GET`, `OPTIONS` always)
//! - Route each request to the view by method
//!
//! # Design Decisions
//! - Allowed methods are reported in a fixed canonical order, not declaration order
//! - `OPTIONS` answers 200 with an `Allow` header and an empty body

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;

use crate::http::request::Request;
use crate::http::response::Reply;
use crate::routing::dispatch::{allow_header, method_not_allowed};
use crate::routing::handler::{BoxHandler, HandlerResult, IntoHandler};

const CANONICAL_ORDER: [Method; 8] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
    Method::TRACE,
];

pub trait View: Send + Sync + 'static {
    /// Methods this view handles itself.
    fn implemented(&self) -> Vec<Method>;

    fn handle(&self, method: &Method, request: &mut Request) -> HandlerResult;
}

/// Every method the view answers, in canonical order.
pub fn allowed_methods(view: &dyn View) -> Vec<Method> {
    let implemented = view.implemented();
    CANONICAL_ORDER
        .into_iter()
        .filter(|m| {
            implemented.contains(m)
                || (*m == Method::HEAD && implemented.contains(&Method::GET))
                || *m == Method::OPTIONS
        })
        .collect()
}

/// Erase a view into a single handler dispatching on method.
pub fn as_handler(view: Arc<dyn View>) -> BoxHandler {
    let implemented = view.implemented();
    let allowed = allowed_methods(view.as_ref());
    Arc::new(move |request: &mut Request| {
        let method = request.method().clone();
        if implemented.contains(&method) {
            view.handle(&method, request)
        } else if method == Method::HEAD && implemented.contains(&Method::GET) {
            view.handle(&Method::GET, request)
        } else if method == Method::OPTIONS {
            Ok(options_response(&allowed).into())
        } else {
            Ok(method_not_allowed(&allowed).into())
        }
    })
}

fn options_response(allowed: &[Method]) -> axum::response::Response {
    let mut response = StatusCode::OK.into_response();
    if let Some(allow) = allow_header(allowed) {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
        .headers_mut()
        .insert(header::CONTENT_LENGTH, HeaderValue::from_static("0"));
    response
}

/// A [`View`] assembled from per-method handlers.
#[derive(Default)]
pub struct MethodView {
    handlers: Vec<(Method, BoxHandler)>,
}

impl MethodView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, method: Method, handler: impl IntoHandler) -> Self {
        let handler = handler.into_handler();
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    pub fn get(self, handler: impl IntoHandler) -> Self {
        self.on(Method::GET, handler)
    }

    pub fn post(self, handler: impl IntoHandler) -> Self {
        self.on(Method::POST, handler)
    }

    pub fn put(self, handler: impl IntoHandler) -> Self {
        self.on(Method::PUT, handler)
    }

    pub fn patch(self, handler: impl IntoHandler) -> Self {
        self.on(Method::PATCH, handler)
    }

    pub fn delete(self, handler: impl IntoHandler) -> Self {
        self.on(Method::DELETE, handler)
    }
}

impl View for MethodView {
    fn implemented(&self) -> Vec<Method> {
        self.handlers.iter().map(|(m, _)| m.clone()).collect()
    }

    fn handle(&self, method: &Method, request: &mut Request) -> HandlerResult {
        match self.handlers.iter().find(|(m, _)| m == method) {
            Some((_, handler)) => handler(request),
            None => Ok(Reply::Response(method_not_allowed(&allowed_methods(self)))),
        }
    }
}

impl std::fmt::Debug for MethodView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodView")
            .field("methods", &self.implemented())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response::text;
    use axum::body::Bytes;

    fn view() -> Arc<dyn View> {
        Arc::new(
            MethodView::new()
                .post(|_: &mut Request| text("POST /view"))
                .get(|_: &mut Request| text("GET /view")),
        )
    }

    fn call(handler: &BoxHandler, method: Method) -> axum::response::Response {
        let raw = axum::http::Request::builder()
            .method(method)
            .uri("/view")
            .body(Bytes::new())
            .unwrap();
        match handler(&mut Request::new(raw)).unwrap() {
            Reply::Response(r) => r,
            Reply::Data(d) => panic!("unexpected data {d}"),
        }
    }

    #[test]
    fn test_allowed_methods_canonical_order() {
        assert_eq!(
            allowed_methods(view().as_ref()),
            vec![Method::GET, Method::POST, Method::HEAD, Method::OPTIONS]
        );
    }

    #[test]
    fn test_head_falls_back_to_get() {
        let handler = as_handler(view());
        assert_eq!(call(&handler, Method::HEAD).status(), StatusCode::OK);
    }

    #[test]
    fn test_options_lists_allowed() {
        let handler = as_handler(view());
        let response = call(&handler, Method::OPTIONS);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ALLOW], "GET, POST, HEAD, OPTIONS");
    }

    #[test]
    fn test_unimplemented_method() {
        let handler = as_handler(view());
        let response = call(&handler, Method::DELETE);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
