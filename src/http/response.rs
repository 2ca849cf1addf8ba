//! Response types and coercion of handler return values.
//!
//! # Responsibilities
//! - Represent what a handler returned ([`Reply`]): a finished response or bare data
//! - Coerce bare data through the configured response class (JSON by default)
//! - Build JSON and plain-text responses with extra headers
//!
//! # Design Decisions
//! - JSON bodies use `": "` / `", "` separators so clients see `{"detail": "Error"}`
//! - Any JSON value is accepted at the top level, `null` included

use std::io;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::Value;

use crate::error::Error;

pub use axum::response::Response;

/// Constructor applied to data a handler returned instead of a response.
pub type ResponseClass = Arc<dyn Fn(Value) -> Response + Send + Sync>;

pub fn default_response_class() -> ResponseClass {
    Arc::new(|data: Value| JsonResponse::new(data).into_response())
}

/// A handler's return value before coercion.
#[derive(Debug)]
pub enum Reply {
    Response(Response),
    Data(Value),
}

impl Reply {
    /// Serialize any value into [`Reply::Data`].
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        serde_json::to_value(value)
            .map(Reply::Data)
            .map_err(Error::other)
    }

    /// Headers of a finished response; `None` for data awaiting coercion.
    pub fn headers_mut(&mut self) -> Option<&mut HeaderMap> {
        match self {
            Reply::Response(response) => Some(response.headers_mut()),
            Reply::Data(_) => None,
        }
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Reply::Response(_))
    }

    /// Finish the reply, passing bare data to `response_class`.
    pub fn into_response(self, response_class: &ResponseClass) -> Response {
        match self {
            Reply::Response(response) => response,
            Reply::Data(data) => response_class(data),
        }
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Reply::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(data: Value) -> Self {
        Reply::Data(data)
    }
}

impl From<JsonResponse> for Reply {
    fn from(response: JsonResponse) -> Self {
        Reply::Response(response.into_response())
    }
}

impl From<TextResponse> for Reply {
    fn from(response: TextResponse) -> Self {
        Reply::Response(response.into_response())
    }
}

/// JSON response with optional status and headers.
#[derive(Debug, Clone)]
pub struct JsonResponse {
    data: Value,
    status: StatusCode,
    headers: HeaderMap,
}

impl JsonResponse {
    pub fn new(data: impl Into<Value>) -> Self {
        Self {
            data: data.into(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

impl IntoResponse for JsonResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, to_json_bytes(&self.data)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        merge_headers(response.headers_mut(), self.headers);
        response
    }
}

/// Plain-text response with optional status and headers.
#[derive(Debug, Clone)]
pub struct TextResponse {
    body: String,
    status: StatusCode,
    headers: HeaderMap,
}

impl TextResponse {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

impl IntoResponse for TextResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, Body::from(self.body)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        merge_headers(response.headers_mut(), self.headers);
        response
    }
}

/// Shorthand for a 200 plain-text response.
pub fn text(body: impl Into<String>) -> Response {
    TextResponse::new(body).into_response()
}

/// Copy `extra` onto `target`, replacing same-named headers.
fn merge_headers(target: &mut HeaderMap, extra: HeaderMap) {
    for name in extra.keys() {
        target.remove(name);
    }
    for (name, value) in extra.iter() {
        target.append(name.clone(), value.clone());
    }
}

/// Serialize with `": "` and `", "` separators.
pub fn to_json_bytes(value: &Value) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, SpacedFormatter);
    if let Err(err) = value.serialize(&mut serializer) {
        tracing::error!(error = %err, "Failed to encode JSON body");
        return b"null".to_vec();
    }
    buf
}

struct SpacedFormatter;

impl Formatter for SpacedFormatter {
    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b": ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn body_bytes(response: Response) -> Vec<u8> {
        axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec()
    }

    #[test]
    fn test_spaced_json() {
        assert_eq!(to_json_bytes(&json!({"detail": "Error"})), br#"{"detail": "Error"}"#);
        assert_eq!(to_json_bytes(&json!([1, 2, 3])), b"[1, 2, 3]");
        assert_eq!(to_json_bytes(&json!({})), b"{}");
        assert_eq!(to_json_bytes(&Value::Null), b"null");
    }

    #[tokio::test]
    async fn test_json_response_headers() {
        let response = JsonResponse::new(Value::Null)
            .header(HeaderName::from_static("x-header"), HeaderValue::from_static("test"))
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-header"], "test");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_bytes(response).await, b"null");
    }

    #[tokio::test]
    async fn test_text_response_headers() {
        let response = TextResponse::new("")
            .header(HeaderName::from_static("x-header"), HeaderValue::from_static("test"))
            .into_response();
        assert_eq!(response.headers()["x-header"], "test");
    }

    #[tokio::test]
    async fn test_default_response_class_encodes_data() {
        let class = default_response_class();
        let response = Reply::from(json!({"success": true})).into_response(&class);
        assert_eq!(body_bytes(response).await, br#"{"success": true}"#);
    }

    #[test]
    fn test_reply_headers_only_for_responses() {
        let mut data = Reply::Data(json!("OK"));
        assert!(data.headers_mut().is_none());
        let mut finished = Reply::from(text("hi"));
        assert!(finished.headers_mut().is_some());
        assert!(finished.is_response());
    }
}
