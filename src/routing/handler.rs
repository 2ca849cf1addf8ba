//! Type-erased route handlers.

use std::sync::Arc;

use serde_json::Value;

use crate::error::Error;
use crate::http::request::Request;
use crate::http::response::{JsonResponse, Reply, Response, TextResponse};

pub type HandlerResult = Result<Reply, Error>;

/// A handler after erasure: what decorators wrap and dispatchers call.
pub type BoxHandler = Arc<dyn Fn(&mut Request) -> HandlerResult + Send + Sync>;

/// Return types a handler may produce.
pub trait IntoHandlerResult {
    fn into_handler_result(self) -> HandlerResult;
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: Into<Reply>,
    E: Into<Error>,
{
    fn into_handler_result(self) -> HandlerResult {
        self.map(Into::into).map_err(Into::into)
    }
}

impl IntoHandlerResult for Reply {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self)
    }
}

impl IntoHandlerResult for Response {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Reply::Response(self))
    }
}

impl IntoHandlerResult for Value {
    fn into_handler_result(self) -> HandlerResult {
        Ok(Reply::Data(self))
    }
}

impl IntoHandlerResult for JsonResponse {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self.into())
    }
}

impl IntoHandlerResult for TextResponse {
    fn into_handler_result(self) -> HandlerResult {
        Ok(self.into())
    }
}

/// Anything registrable as a route handler.
pub trait IntoHandler {
    fn into_handler(self) -> BoxHandler;
}

impl<F, R> IntoHandler for F
where
    F: Fn(&mut Request) -> R + Send + Sync + 'static,
    R: IntoHandlerResult,
{
    fn into_handler(self) -> BoxHandler {
        Arc::new(move |request: &mut Request| self(request).into_handler_result())
    }
}

/// Erase a handler without registering it (useful inside decorators).
pub fn boxed(handler: impl IntoHandler) -> BoxHandler {
    handler.into_handler()
}
