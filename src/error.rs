//! Error taxonomy for the routing layer.
//!
//! # Categories
//! - [`RouterError`]: configuration mistakes caught while routes are registered
//! - [`ApiException`]: declared API errors carrying status, detail and headers
//! - [`Error::NotFound`] / [`Error::PermissionDenied`]: framework-native conditions
//!   with fixed status codes
//! - everything else ([`Error::Other`], [`Error::MissingAttribute`],
//!   [`Error::ImproperlyConfigured`]) is never translated and escapes to the host
//!
//! # Design Decisions
//! - Translation to a response happens once, at the outermost dispatch boundary
//! - Handlers return `Result<_, Error>`; `?` works on anything boxable

use std::fmt;

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// An error raised on purpose by a handler, rendered as a structured response.
///
/// `detail` defaults to the canonical reason phrase of the status code.
#[derive(Debug, Clone)]
pub struct ApiException {
    pub status: StatusCode,
    pub detail: Value,
    pub headers: HeaderMap,
}

impl ApiException {
    pub fn new(status: StatusCode) -> Self {
        let phrase = status.canonical_reason().unwrap_or_default();
        Self {
            status,
            detail: Value::String(phrase.to_string()),
            headers: HeaderMap::new(),
        }
    }

    /// Shorthand for a 400 with the given detail.
    pub fn bad_request(detail: impl Into<Value>) -> Self {
        Self::new(StatusCode::BAD_REQUEST).with_detail(detail)
    }

    pub fn with_detail(mut self, detail: impl Into<Value>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }
}

impl fmt::Display for ApiException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Value::String(detail) => f.write_str(detail),
            other => write!(f, "{}", other),
        }
    }
}

impl std::error::Error for ApiException {}

/// Everything a handler, decorator or middleware can fail with.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiException),

    #[error("Not Found")]
    NotFound,

    #[error("Forbidden")]
    PermissionDenied,

    /// Typed attribute lookup failed on both the façade and the raw request.
    #[error("'{owner}' object has no attribute '{attribute}'")]
    MissingAttribute {
        owner: &'static str,
        attribute: &'static str,
    },

    /// A collaborator the request relies on (session, auth) was not enabled.
    #[error("{0}")]
    ImproperlyConfigured(String),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap any error (or message) as an untranslated failure.
    pub fn other(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Other(error.into())
    }

    /// Whether the default exception handler knows how to render this error.
    pub fn is_translatable(&self) -> bool {
        matches!(self, Self::Api(_) | Self::NotFound | Self::PermissionDenied)
    }
}

/// Configuration errors detected while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    #[error("A path prefix must not start with '/' (got {0:?})")]
    InvalidPrefix(String),
}

/// A built URL table that cannot be served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    #[error("Route '{path}': segment {segment:?} must use '{{name}}' captures")]
    InvalidSegment { path: String, segment: String },

    #[error("Route '{path}' conflicts with another route: {reason}")]
    Conflict { path: String, reason: String },
}

/// Failures of name-based URL reversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReverseError {
    #[error("Reverse for '{0}' not found")]
    NoMatch(String),

    #[error("Reverse for '{name}' is missing parameter '{param}'")]
    MissingParam { name: String, param: String },
}
