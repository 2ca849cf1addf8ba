//! Request/response middleware adapted to run around a single route.

use axum::http::{HeaderName, HeaderValue};

use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::Response;

/// Hook pair run around a route's handler.
///
/// Returning a response from `process_request` short-circuits the handler
/// and every middleware declared after this one.
pub trait Middleware: Send + Sync + 'static {
    fn process_request(&self, _request: &mut Request) -> Result<Option<Response>, Error> {
        Ok(None)
    }

    fn process_response(&self, _request: &Request, response: Response) -> Response {
        response
    }
}

/// Sets a fixed header on every response.
#[derive(Debug, Clone)]
pub struct SetResponseHeader {
    name: HeaderName,
    value: HeaderValue,
}

impl SetResponseHeader {
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }
}

impl Middleware for SetResponseHeader {
    fn process_response(&self, _request: &Request, mut response: Response) -> Response {
        response
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        response
    }
}
