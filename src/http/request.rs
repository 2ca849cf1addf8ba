//! Request façade handed to route handlers.
//!
//! # Responsibilities
//! - Wrap one buffered raw request for the duration of a single dispatch
//! - Expose convenience accessors (query, form, cookies, content type, ...)
//! - Parse the JSON body at most once and memoize the outcome
//! - Fall back transparently to the raw request for everything else
//!
//! # Design Decisions
//! - `Deref` to the raw `http::Request<Bytes>` plays the role of attribute fallback
//! - Typed extension lookup (`attr`) consults the façade first, then the raw request
//! - Derived values are cached in `OnceLock`s; nothing is shared across requests

use std::collections::HashMap;
use std::ops::Deref;
use std::sync::{Arc, OnceLock};

use axum::body::Bytes;
use axum::http::{header, Extensions, HeaderMap, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiException, Error};
use crate::http::query::QueryDict;
use crate::routing::ResolverMatch;

/// The inbound request as delivered by the hosting framework, body buffered.
pub type RawRequest = axum::http::Request<Bytes>;

/// Factory turning a raw request into the façade handlers receive.
///
/// Overriding it per router or per route is how handlers get extra typed
/// attributes attached before they run.
pub type RequestClass = Arc<dyn Fn(RawRequest) -> Request + Send + Sync>;

pub fn default_request_class() -> RequestClass {
    Arc::new(Request::new)
}

const INVALID_JSON: &str = "Invalid JSON body.";

/// Session data installed by the host's session layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session(pub serde_json::Map<String, Value>);

impl Session {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Authenticated principal installed by the host's auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub is_authenticated: bool,
}

impl User {
    pub fn anonymous() -> Self {
        Self {
            username: String::new(),
            is_authenticated: false,
        }
    }
}

/// One uploaded file, parsed by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Uploaded files for a request. Parsing multipart bodies is the host's job;
/// it installs this as a request extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadedFiles(Vec<UploadedFile>);

impl UploadedFiles {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, field_name: &str) -> Option<&UploadedFile> {
        self.0.iter().find(|f| f.field_name == field_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UploadedFile> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<UploadedFile> for UploadedFiles {
    fn from_iter<I: IntoIterator<Item = UploadedFile>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

static NO_FILES: UploadedFiles = UploadedFiles::new();

/// Normalized view over a raw request.
#[derive(Debug)]
pub struct Request {
    raw: RawRequest,
    extensions: Extensions,
    encoding: Option<String>,
    json: OnceLock<Option<Value>>,
    query: OnceLock<QueryDict>,
    form: OnceLock<QueryDict>,
    cookies: OnceLock<HashMap<String, String>>,
}

impl Request {
    pub fn new(raw: RawRequest) -> Self {
        Self {
            raw,
            extensions: Extensions::new(),
            encoding: None,
            json: OnceLock::new(),
            query: OnceLock::new(),
            form: OnceLock::new(),
            cookies: OnceLock::new(),
        }
    }

    pub fn raw(&self) -> &RawRequest {
        &self.raw
    }

    pub fn into_raw(self) -> RawRequest {
        self.raw
    }

    pub fn method(&self) -> &Method {
        self.raw.method()
    }

    pub fn path(&self) -> &str {
        self.raw.uri().path()
    }

    /// Path relative to the application root. No script prefix is mounted,
    /// so this equals [`Request::path`].
    pub fn path_info(&self) -> &str {
        self.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.raw.headers()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.headers().get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        self.raw.body()
    }

    pub fn query_params(&self) -> &QueryDict {
        self.query.get_or_init(|| {
            self.raw
                .uri()
                .query()
                .map(|q| QueryDict::parse(q.as_bytes()))
                .unwrap_or_default()
        })
    }

    /// Urlencoded form fields. Empty for any other content type.
    pub fn form(&self) -> &QueryDict {
        self.form.get_or_init(|| {
            if self.content_type() == Some("application/x-www-form-urlencoded") {
                QueryDict::parse(self.raw.body())
            } else {
                QueryDict::new()
            }
        })
    }

    pub fn files(&self) -> &UploadedFiles {
        self.raw
            .extensions()
            .get::<UploadedFiles>()
            .unwrap_or(&NO_FILES)
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        self.cookies.get_or_init(|| {
            self.raw
                .headers()
                .get_all(header::COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .flat_map(|v| v.split(';'))
                .filter_map(|pair| pair.trim().split_once('='))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect()
        })
    }

    /// Media type of the body, without parameters.
    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE.as_str())
            .map(|ct| split_content_type(ct).0)
    }

    /// Parameters following the media type (`charset`, ...).
    pub fn content_params(&self) -> HashMap<String, String> {
        self.header(header::CONTENT_TYPE.as_str())
            .map(|ct| split_content_type(ct).1)
            .unwrap_or_default()
    }

    pub fn scheme(&self) -> &str {
        self.raw.uri().scheme_str().unwrap_or("http")
    }

    pub fn is_secure(&self) -> bool {
        self.scheme() == "https"
    }

    /// Host taken from the `Host` header, then the URI authority.
    pub fn host(&self) -> Option<&str> {
        self.header(header::HOST.as_str())
            .or_else(|| self.raw.uri().authority().map(|a| a.as_str()))
    }

    pub fn port(&self) -> u16 {
        let explicit = self
            .host()
            .and_then(|h| h.rsplit_once(':'))
            .and_then(|(_, port)| port.parse().ok());
        explicit.unwrap_or(if self.is_secure() { 443 } else { 80 })
    }

    /// Path plus query string, if any.
    pub fn get_full_path(&self) -> String {
        match self.raw.uri().query() {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path(), q),
            _ => self.path().to_string(),
        }
    }

    /// Absolute URI for `location` (or the current full path).
    pub fn build_absolute_uri(&self, location: Option<&str>) -> String {
        let location = location
            .map(str::to_string)
            .unwrap_or_else(|| self.get_full_path());
        if location.contains("://") {
            return location;
        }
        let host = self.host().unwrap_or("localhost");
        format!("{}://{}{}", self.scheme(), host, location)
    }

    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    pub fn set_encoding(&mut self, encoding: impl Into<String>) {
        self.encoding = Some(encoding.into());
    }

    /// Route match attached by the hosting adapter, if dispatched through it.
    pub fn resolver_match(&self) -> Option<&ResolverMatch> {
        self.raw.extensions().get::<ResolverMatch>()
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.resolver_match().and_then(|m| m.param(name))
    }

    /// Parsed JSON body. Parsed once; both success and failure are memoized.
    pub fn json(&self) -> Result<&Value, Error> {
        self.json
            .get_or_init(|| serde_json::from_slice(self.raw.body()).ok())
            .as_ref()
            .ok_or_else(|| ApiException::bad_request(INVALID_JSON).into())
    }

    /// Deserialize the JSON body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, Error> {
        let value = self.json()?;
        T::deserialize(value).map_err(|err| {
            ApiException::new(StatusCode::BAD_REQUEST)
                .with_detail(err.to_string())
                .into()
        })
    }

    /// Attach a typed attribute to this façade.
    pub fn insert<T: Clone + Send + Sync + 'static>(&mut self, value: T) -> Option<T> {
        self.extensions.insert(value)
    }

    /// Typed attribute lookup: façade first, raw request second.
    pub fn attr<T: Send + Sync + 'static>(&self) -> Result<&T, Error> {
        self.extensions
            .get::<T>()
            .or_else(|| self.raw.extensions().get::<T>())
            .ok_or(Error::MissingAttribute {
                owner: "Request",
                attribute: std::any::type_name::<T>(),
            })
    }

    pub fn session(&self) -> Result<&Session, Error> {
        self.attr::<Session>().map_err(|_| {
            Error::ImproperlyConfigured(
                "Request has no session: the host did not install a session layer".into(),
            )
        })
    }

    pub fn user(&self) -> Result<&User, Error> {
        self.attr::<User>().map_err(|_| {
            Error::ImproperlyConfigured(
                "Request has no user: the host did not install an authentication layer".into(),
            )
        })
    }
}

impl Deref for Request {
    type Target = RawRequest;

    fn deref(&self) -> &Self::Target {
        &self.raw
    }
}

impl From<RawRequest> for Request {
    fn from(raw: RawRequest) -> Self {
        Self::new(raw)
    }
}

fn split_content_type(value: &str) -> (&str, HashMap<String, String>) {
    let mut parts = value.split(';');
    let media_type = parts.next().unwrap_or_default().trim();
    let params = parts
        .filter_map(|p| p.split_once('='))
        .map(|(k, v)| {
            (
                k.trim().to_ascii_lowercase(),
                v.trim().trim_matches('"').to_string(),
            )
        })
        .collect();
    (media_type, params)
}
