//! Registered route entries, before build.

use std::sync::Arc;

use axum::http::Method;

use crate::http::request::RequestClass;
use crate::middleware::Decorator;
use crate::routing::handler::BoxHandler;
use crate::routing::router::Router;
use crate::routing::view::View;

/// Per-route overrides layered on top of the router's settings.
#[derive(Clone, Default)]
pub struct RouteOptions {
    pub decorators: Vec<Decorator>,
    pub request_class: Option<RequestClass>,
}

impl std::fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteOptions")
            .field("decorators", &self.decorators.len())
            .field("request_class", &self.request_class.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub struct FunctionRoute {
    pub path: String,
    pub handler: BoxHandler,
    pub methods: Vec<Method>,
    pub name: Option<String>,
    pub options: RouteOptions,
}

#[derive(Clone)]
pub struct ViewRoute {
    pub path: String,
    pub view: Arc<dyn View>,
    pub name: Option<String>,
    pub options: RouteOptions,
}

#[derive(Debug, Clone)]
pub struct IncludeRoute {
    pub router: Arc<Router>,
    pub prefix: String,
}

/// One registration on a [`Router`], kept in insertion order.
#[derive(Debug, Clone)]
pub enum Route {
    Function(FunctionRoute),
    View(ViewRoute),
    Include(IncludeRoute),
}

impl Route {
    pub fn path(&self) -> &str {
        match self {
            Route::Function(route) => &route.path,
            Route::View(route) => &route.path,
            Route::Include(route) => &route.prefix,
        }
    }
}

impl std::fmt::Debug for FunctionRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRoute")
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ViewRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewRoute")
            .field("path", &self.path)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Drop duplicates keeping first occurrence; empty means `[GET]`.
pub fn normalize_methods(methods: impl IntoIterator<Item = Method>) -> Vec<Method> {
    let mut normalized: Vec<Method> = Vec::new();
    for method in methods {
        if !normalized.contains(&method) {
            normalized.push(method);
        }
    }
    if normalized.is_empty() {
        normalized.push(Method::GET);
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_methods() {
        assert_eq!(normalize_methods(Vec::new()), vec![Method::GET]);
        assert_eq!(
            normalize_methods([Method::POST, Method::GET, Method::POST]),
            vec![Method::POST, Method::GET]
        );
    }
}
