//! Named components selectable from configuration.
//!
//! `[apirouter]` settings refer to request classes, response classes and
//! exception handlers by string identifier. The registry maps those
//! identifiers to the actual components at startup.

use std::collections::HashMap;
use std::sync::Arc;

use axum::response::IntoResponse;
use serde_json::Value;

use crate::config::defaults::Defaults;
use crate::config::loader::ConfigError;
use crate::config::schema::RouterSettings;
use crate::exception_handler::{default_exception_handler, ExceptionHandler};
use crate::http::request::{default_request_class, RequestClass};
use crate::http::response::{default_response_class, to_json_bytes, ResponseClass, TextResponse};

pub const DEFAULT: &str = "default";

pub struct Registry {
    request_classes: HashMap<String, RequestClass>,
    response_classes: HashMap<String, ResponseClass>,
    exception_handlers: HashMap<String, ExceptionHandler>,
}

impl Registry {
    /// A registry holding the built-in components.
    ///
    /// `"default"` is registered for all three kinds; `"json"` and `"text"`
    /// are registered as response classes.
    pub fn new() -> Self {
        let mut registry = Self {
            request_classes: HashMap::new(),
            response_classes: HashMap::new(),
            exception_handlers: HashMap::new(),
        };
        registry
            .register_request_class(DEFAULT, default_request_class())
            .register_response_class(DEFAULT, default_response_class())
            .register_response_class("json", default_response_class())
            .register_response_class("text", text_response_class())
            .register_exception_handler(DEFAULT, default_exception_handler());
        registry
    }

    pub fn register_request_class(&mut self, name: &str, class: RequestClass) -> &mut Self {
        self.request_classes.insert(name.to_string(), class);
        self
    }

    pub fn register_response_class(&mut self, name: &str, class: ResponseClass) -> &mut Self {
        self.response_classes.insert(name.to_string(), class);
        self
    }

    pub fn register_exception_handler(&mut self, name: &str, handler: ExceptionHandler) -> &mut Self {
        self.exception_handlers.insert(name.to_string(), handler);
        self
    }

    /// Resolve `settings` to concrete components; unset keys use the built-ins.
    pub fn resolve(&self, settings: &RouterSettings) -> Result<Defaults, ConfigError> {
        let fallback = Defaults::default();
        Ok(Defaults {
            request_class: lookup(
                &self.request_classes,
                "request class",
                settings.default_request_class.as_deref(),
            )?
            .unwrap_or(fallback.request_class),
            response_class: lookup(
                &self.response_classes,
                "response class",
                settings.default_response_class.as_deref(),
            )?
            .unwrap_or(fallback.response_class),
            exception_handler: lookup(
                &self.exception_handlers,
                "exception handler",
                settings.default_exception_handler.as_deref(),
            )?
            .unwrap_or(fallback.exception_handler),
        })
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn lookup<T: Clone>(
    entries: &HashMap<String, T>,
    kind: &'static str,
    name: Option<&str>,
) -> Result<Option<T>, ConfigError> {
    match name {
        None => Ok(None),
        Some(name) => entries
            .get(name)
            .cloned()
            .map(Some)
            .ok_or_else(|| ConfigError::UnknownComponent {
                kind,
                name: name.to_string(),
            }),
    }
}

/// Strings render as-is; anything else renders as JSON text.
fn text_response_class() -> ResponseClass {
    Arc::new(|data: Value| {
        let body = match data {
            Value::String(text) => text,
            other => String::from_utf8_lossy(&to_json_bytes(&other)).into_owned(),
        };
        TextResponse::new(body).into_response()
    })
}
