//! Route registration and table build.
//!
//! # Responsibilities
//! - Record function routes, views and sub-router includes in insertion order
//! - Hold router-wide settings: decorators, middleware, exception handler,
//!   request and response classes
//! - Build the [`UrlPatterns`] table once, on first access
//!
//! # Design Decisions
//! - Single-method routes on one path merge into one dispatcher
//! - A multi-method route or a view on an existing path replaces that group, keeping its position
//! - Includes are held behind `Arc`, so a router can never include itself
//! - Unset settings fall back to the process-wide [`Defaults`](crate::config::Defaults)

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use axum::http::Method;

use crate::config;
use crate::error::RouterError;
use crate::exception_handler::ExceptionHandler;
use crate::http::request::RequestClass;
use crate::http::response::ResponseClass;
use crate::middleware::{compose, Decorator, Middleware};
use crate::routing::dispatch::{Dispatcher, Endpoint};
use crate::routing::handler::{BoxHandler, IntoHandler};
use crate::routing::route::{
    normalize_methods, FunctionRoute, IncludeRoute, Route, RouteOptions, ViewRoute,
};
use crate::routing::urls::{UrlEntry, UrlPattern, UrlPatterns};
use crate::routing::view::{self, View};

#[derive(Default)]
pub struct Router {
    name: Option<String>,
    routes: Vec<Route>,
    decorators: Vec<Decorator>,
    middleware: Vec<Arc<dyn Middleware>>,
    exception_handler: Option<ExceptionHandler>,
    request_class: Option<RequestClass>,
    response_class: Option<ResponseClass>,
    urls: OnceLock<Arc<UrlPatterns>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// A router whose route names are namespaced under `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_decorator(mut self, decorator: Decorator) -> Self {
        self.decorators.push(decorator);
        self
    }

    pub fn with_decorators(mut self, decorators: impl IntoIterator<Item = Decorator>) -> Self {
        self.decorators.extend(decorators);
        self
    }

    pub fn with_middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    pub fn with_exception_handler(mut self, handler: ExceptionHandler) -> Self {
        self.exception_handler = Some(handler);
        self
    }

    pub fn with_request_class(mut self, class: RequestClass) -> Self {
        self.request_class = Some(class);
        self
    }

    pub fn with_response_class(mut self, class: ResponseClass) -> Self {
        self.response_class = Some(class);
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Register `handler` at `path` verbatim (no slash stripping).
    pub fn add_route(
        &mut self,
        path: impl Into<String>,
        handler: impl IntoHandler,
        methods: impl IntoIterator<Item = Method>,
        name: Option<&str>,
    ) -> &mut Self {
        self.push(Route::Function(FunctionRoute {
            path: path.into(),
            handler: handler.into_handler(),
            methods: normalize_methods(methods),
            name: name.map(str::to_string),
            options: RouteOptions::default(),
        }));
        self
    }

    /// Start a route at `path`; one leading `/` is stripped.
    pub fn route(&mut self, path: &str) -> RouteBuilder<'_> {
        RouteBuilder {
            router: self,
            path: strip_leading_slash(path).to_string(),
            methods: Vec::new(),
            name: None,
            options: RouteOptions::default(),
        }
    }

    pub fn get(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::GET)
    }

    pub fn put(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::PUT)
    }

    pub fn post(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::POST)
    }

    pub fn delete(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::DELETE)
    }

    pub fn options(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::OPTIONS)
    }

    pub fn head(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::HEAD)
    }

    pub fn patch(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::PATCH)
    }

    pub fn trace(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(path).method(Method::TRACE)
    }

    /// Start a class-style route at `path`; one leading `/` is stripped.
    pub fn view(&mut self, path: &str) -> ViewBuilder<'_> {
        ViewBuilder {
            router: self,
            path: strip_leading_slash(path).to_string(),
            name: None,
            options: RouteOptions::default(),
        }
    }

    /// Mount `router` under `prefix`, which must not start with `/`.
    pub fn include_router(
        &mut self,
        router: impl Into<Arc<Router>>,
        prefix: Option<&str>,
    ) -> Result<&mut Self, RouterError> {
        let prefix = prefix.unwrap_or_default();
        if prefix.starts_with('/') {
            return Err(RouterError::InvalidPrefix(prefix.to_string()));
        }
        self.push(Route::Include(IncludeRoute {
            router: router.into(),
            prefix: prefix.to_string(),
        }));
        Ok(self)
    }

    /// The built table, cached after the first call.
    pub fn urls(&self) -> Arc<UrlPatterns> {
        self.urls.get_or_init(|| Arc::new(self.build())).clone()
    }

    fn push(&mut self, route: Route) {
        self.urls.take();
        self.routes.push(route);
    }

    fn build(&self) -> UrlPatterns {
        let settings = self.settings();
        let mut entries: Vec<UrlEntry> = Vec::new();
        let mut groups: HashMap<String, Group> = HashMap::new();

        for route in &self.routes {
            match route {
                Route::Function(route) if route.methods.len() == 1 => {
                    let method = route.methods[0].clone();
                    let endpoint = settings.endpoint(route.handler.clone(), &route.options);
                    let slot = match groups.get_mut(&route.path) {
                        Some(group) if group.mergeable => group.index,
                        Some(group) => {
                            tracing::warn!(path = %route.path, "Route replaces an existing multi-method route");
                            group.mergeable = true;
                            replace(&mut entries, group.index, Dispatcher::new(), route.name.as_deref());
                            group.index
                        }
                        None => {
                            let index = append(&mut entries, &route.path, Dispatcher::new(), route.name.as_deref());
                            groups.insert(route.path.clone(), Group { index, mergeable: true });
                            index
                        }
                    };
                    if let UrlEntry::Pattern(pattern) = &mut entries[slot] {
                        pattern.dispatcher.insert(method, endpoint);
                        if pattern.name.is_none() {
                            pattern.name = route.name.clone();
                        }
                    }
                }
                Route::Function(route) => {
                    let endpoint = settings.endpoint(route.handler.clone(), &route.options);
                    let dispatcher = dispatcher_for(&route.methods, endpoint);
                    self.place(&mut entries, &mut groups, &route.path, dispatcher, route.name.as_deref());
                }
                Route::View(route) => {
                    let allowed = view::allowed_methods(route.view.as_ref());
                    let handler = view::as_handler(route.view.clone());
                    let endpoint = settings.endpoint(handler, &route.options);
                    let dispatcher = dispatcher_for(&allowed, endpoint);
                    self.place(&mut entries, &mut groups, &route.path, dispatcher, route.name.as_deref());
                }
                Route::Include(include) => entries.push(UrlEntry::Include {
                    prefix: include.prefix.clone(),
                    patterns: include.router.urls(),
                }),
            }
        }

        tracing::debug!(
            namespace = self.name.as_deref().unwrap_or_default(),
            entries = entries.len(),
            "Built URL table"
        );
        UrlPatterns::new(self.name.clone(), entries)
    }

    /// Bind a complete dispatcher at `path`, replacing any existing group.
    fn place(
        &self,
        entries: &mut Vec<UrlEntry>,
        groups: &mut HashMap<String, Group>,
        path: &str,
        dispatcher: Dispatcher,
        name: Option<&str>,
    ) {
        match groups.get_mut(path) {
            Some(group) => {
                tracing::warn!(path = %path, "Route replaces an existing route on the same path");
                group.mergeable = false;
                replace(entries, group.index, dispatcher, name);
            }
            None => {
                let index = append(entries, path, dispatcher, name);
                groups.insert(path.to_string(), Group { index, mergeable: false });
            }
        }
    }

    fn settings(&self) -> Settings<'_> {
        let defaults = config::defaults();
        Settings {
            decorators: &self.decorators,
            middleware: &self.middleware,
            request_class: self
                .request_class
                .clone()
                .unwrap_or_else(|| defaults.request_class.clone()),
            response_class: self
                .response_class
                .clone()
                .unwrap_or_else(|| defaults.response_class.clone()),
            exception_handler: self
                .exception_handler
                .clone()
                .unwrap_or_else(|| defaults.exception_handler.clone()),
        }
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("name", &self.name)
            .field("routes", &self.routes)
            .field("decorators", &self.decorators.len())
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

/// Position of a path's group within the table under construction.
struct Group {
    index: usize,
    /// Built from single-method routes, so further ones merge into it.
    mergeable: bool,
}

/// Router settings resolved against the process defaults for one build.
struct Settings<'a> {
    decorators: &'a [Decorator],
    middleware: &'a [Arc<dyn Middleware>],
    request_class: RequestClass,
    response_class: ResponseClass,
    exception_handler: ExceptionHandler,
}

impl Settings<'_> {
    fn endpoint(&self, handler: BoxHandler, options: &RouteOptions) -> Arc<Endpoint> {
        let chain: Vec<Decorator> = self
            .decorators
            .iter()
            .chain(options.decorators.iter())
            .cloned()
            .collect();
        Arc::new(Endpoint::new(
            compose(&chain, handler),
            options
                .request_class
                .clone()
                .unwrap_or_else(|| self.request_class.clone()),
            self.response_class.clone(),
            self.exception_handler.clone(),
            self.middleware.to_vec(),
        ))
    }
}

fn dispatcher_for(methods: &[Method], endpoint: Arc<Endpoint>) -> Dispatcher {
    let mut dispatcher = Dispatcher::new();
    for method in methods {
        dispatcher.insert(method.clone(), endpoint.clone());
    }
    dispatcher
}

fn append(entries: &mut Vec<UrlEntry>, path: &str, dispatcher: Dispatcher, name: Option<&str>) -> usize {
    entries.push(UrlEntry::Pattern(UrlPattern {
        path: path.to_string(),
        dispatcher,
        name: name.map(str::to_string),
    }));
    entries.len() - 1
}

/// Swap the dispatcher at `index`; the first non-empty name sticks.
fn replace(entries: &mut [UrlEntry], index: usize, dispatcher: Dispatcher, name: Option<&str>) {
    if let UrlEntry::Pattern(pattern) = &mut entries[index] {
        pattern.dispatcher = dispatcher;
        if pattern.name.is_none() {
            pattern.name = name.map(str::to_string);
        }
    }
}

fn strip_leading_slash(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

/// Pending function route; finished by [`RouteBuilder::handle`].
#[must_use = "a route is only registered once `handle` is called"]
pub struct RouteBuilder<'a> {
    router: &'a mut Router,
    path: String,
    methods: Vec<Method>,
    name: Option<String>,
    options: RouteOptions,
}

impl<'a> RouteBuilder<'a> {
    pub fn method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Route-level decorator; applied inside the router's own.
    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.options.decorators.push(decorator);
        self
    }

    pub fn request_class(mut self, class: RequestClass) -> Self {
        self.options.request_class = Some(class);
        self
    }

    pub fn handle(self, handler: impl IntoHandler) -> &'a mut Router {
        self.router.push(Route::Function(FunctionRoute {
            path: self.path,
            handler: handler.into_handler(),
            methods: normalize_methods(self.methods),
            name: self.name,
            options: self.options,
        }));
        self.router
    }
}

/// Pending view route; finished by [`ViewBuilder::handle`].
#[must_use = "a view is only registered once `handle` is called"]
pub struct ViewBuilder<'a> {
    router: &'a mut Router,
    path: String,
    name: Option<String>,
    options: RouteOptions,
}

impl<'a> ViewBuilder<'a> {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn decorator(mut self, decorator: Decorator) -> Self {
        self.options.decorators.push(decorator);
        self
    }

    pub fn request_class(mut self, class: RequestClass) -> Self {
        self.options.request_class = Some(class);
        self
    }

    pub fn handle(self, view: impl View) -> &'a mut Router {
        self.router.push(Route::View(ViewRoute {
            path: self.path,
            view: Arc::new(view),
            name: self.name,
            options: self.options,
        }));
        self.router
    }
}
