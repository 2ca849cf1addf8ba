//! Per-request dispatch: method selection and the handler pipeline.
//!
//! # Data Flow
//! ```text
//! RawRequest
//!     → Dispatcher (pick endpoint by method, or 405 with Allow)
//!     → Endpoint::call
//!         → request class builds the façade
//!         → middleware / decorators / handler / coercion
//!         → on Err: exception handler (once)
//!     → Ok(Response) or Err(untranslated error) for the host
//! ```

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;

use crate::error::Error;
use crate::exception_handler::ExceptionHandler;
use crate::http::request::{RawRequest, Request, RequestClass};
use crate::http::response::{ResponseClass, Response};
use crate::middleware::Middleware;
use crate::routing::handler::BoxHandler;

/// One route's fully configured handler pipeline.
pub struct Endpoint {
    handler: BoxHandler,
    request_class: RequestClass,
    response_class: ResponseClass,
    exception_handler: ExceptionHandler,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Endpoint {
    /// `handler` must already carry its decorators.
    pub fn new(
        handler: BoxHandler,
        request_class: RequestClass,
        response_class: ResponseClass,
        exception_handler: ExceptionHandler,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> Self {
        Self {
            handler,
            request_class,
            response_class,
            exception_handler,
            middleware,
        }
    }

    pub fn call(&self, raw: RawRequest) -> Result<Response, Error> {
        let mut request = (self.request_class)(raw);
        match self.run(&mut request) {
            Ok(response) => Ok(response),
            Err(error) => {
                tracing::debug!(
                    method = %request.method(),
                    path = %request.path(),
                    error = %error,
                    "Handler failed, invoking exception handler"
                );
                (self.exception_handler)(&request, error)
            }
        }
    }

    fn run(&self, request: &mut Request) -> Result<Response, Error> {
        for (depth, middleware) in self.middleware.iter().enumerate() {
            if let Some(response) = middleware.process_request(request)? {
                return Ok(self.unwind(request, response, depth));
            }
        }

        let reply = (self.handler)(request)?;
        let response = reply.into_response(&self.response_class);
        Ok(self.unwind(request, response, self.middleware.len()))
    }

    /// Run `process_response` for the first `depth` middleware, innermost first.
    fn unwind(&self, request: &Request, response: Response, depth: usize) -> Response {
        self.middleware[..depth]
            .iter()
            .rev()
            .fold(response, |response, m| m.process_response(request, response))
    }
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Method-aware entry point bound to one path.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    methods: Vec<(Method, Arc<Endpoint>)>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `method`; an existing binding is replaced in place.
    pub fn insert(&mut self, method: Method, endpoint: Arc<Endpoint>) {
        match self.methods.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = endpoint,
            None => self.methods.push((method, endpoint)),
        }
    }

    /// Allowed methods in registration order.
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.methods.iter().map(|(m, _)| m.clone()).collect()
    }

    pub fn allows(&self, method: &Method) -> bool {
        self.methods.iter().any(|(m, _)| m == method)
    }

    pub fn call(&self, raw: RawRequest) -> Result<Response, Error> {
        match self.methods.iter().find(|(m, _)| m == raw.method()) {
            Some((_, endpoint)) => endpoint.call(raw),
            None => {
                tracing::warn!(
                    method = %raw.method(),
                    path = %raw.uri().path(),
                    "Method Not Allowed"
                );
                Ok(method_not_allowed(&self.allowed_methods()))
            }
        }
    }
}

/// `Allow` header value: methods joined by `", "`.
pub fn allow_header(allowed: &[Method]) -> Option<HeaderValue> {
    let joined = allowed
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&joined).ok()
}

/// Empty 405 response enumerating `allowed`.
pub fn method_not_allowed(allowed: &[Method]) -> Response {
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    if let Some(allow) = allow_header(allowed) {
        response.headers_mut().insert(header::ALLOW, allow);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception_handler::default_exception_handler;
    use crate::http::request::default_request_class;
    use crate::http::response::{default_response_class, text};
    use crate::middleware::SetResponseHeader;
    use crate::routing::handler::boxed;
    use axum::body::Bytes;
    use axum::http::HeaderName;

    fn endpoint(body: &'static str) -> Arc<Endpoint> {
        endpoint_with(boxed(move |_: &mut Request| text(body)), Vec::new())
    }

    fn endpoint_with(handler: BoxHandler, middleware: Vec<Arc<dyn Middleware>>) -> Arc<Endpoint> {
        Arc::new(Endpoint::new(
            handler,
            default_request_class(),
            default_response_class(),
            default_exception_handler(),
            middleware,
        ))
    }

    fn raw(method: Method) -> RawRequest {
        axum::http::Request::builder()
            .method(method)
            .uri("/method")
            .body(Bytes::new())
            .unwrap()
    }

    #[test]
    fn test_merged_methods_keep_registration_order() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.insert(Method::PUT, endpoint("put"));
        dispatcher.insert(Method::GET, endpoint("get"));
        dispatcher.insert(Method::PUT, endpoint("put again"));
        assert_eq!(dispatcher.allowed_methods(), vec![Method::PUT, Method::GET]);

        let response = dispatcher.call(raw(Method::DELETE)).unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[header::ALLOW], "PUT, GET");
    }

    #[test]
    fn test_unknown_error_escapes() {
        let mut dispatcher = Dispatcher::new();
        let failing = boxed(|_: &mut Request| -> Result<Response, Error> {
            Err(Error::other("boom"))
        });
        dispatcher.insert(Method::GET, endpoint_with(failing, Vec::new()));
        let err = dispatcher.call(raw(Method::GET)).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_translated_error_becomes_response() {
        let mut dispatcher = Dispatcher::new();
        let missing = boxed(|_: &mut Request| -> Result<Response, Error> { Err(Error::NotFound) });
        dispatcher.insert(Method::GET, endpoint_with(missing, Vec::new()));
        let response = dispatcher.call(raw(Method::GET)).unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_middleware_wraps_response() {
        let header_mw: Arc<dyn Middleware> = Arc::new(SetResponseHeader::new(
            HeaderName::from_static("x-middleware-test"),
            HeaderValue::from_static("yes"),
        ));
        let ep = endpoint_with(boxed(|_: &mut Request| text("ok")), vec![header_mw]);
        let response = ep.call(raw(Method::GET)).unwrap();
        assert_eq!(response.headers()["x-middleware-test"], "yes");
    }

    #[test]
    fn test_short_circuit_skips_handler() {
        struct Deny;
        impl Middleware for Deny {
            fn process_request(&self, _request: &mut Request) -> Result<Option<Response>, Error> {
                Ok(Some(StatusCode::UNAUTHORIZED.into_response()))
            }
        }
        let handler = boxed(|_: &mut Request| -> Result<Response, Error> {
            panic!("handler must not run")
        });
        let deny: Arc<dyn Middleware> = Arc::new(Deny);
        let ep = endpoint_with(handler, vec![deny]);
        let response = ep.call(raw(Method::GET)).unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
