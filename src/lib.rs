//! Route registration and dispatch on top of Axum.
//!
//! Routes are declared on [`Router`]s, grouped by path into method-aware
//! dispatchers, wrapped in decorators and middleware, and served by
//! [`HttpServer`]. Errors are translated into responses once per request by
//! the router's exception handler.

pub mod config;
pub mod demo;
pub mod error;
pub mod exception_handler;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::schema::AppConfig;
pub use error::{ApiException, Error, MountError, ReverseError, RouterError};
pub use exception_handler::ExceptionHandler;
pub use http::{HttpServer, JsonResponse, Reply, Request, Response, TextResponse};
pub use lifecycle::Shutdown;
pub use middleware::{decorator, Decorator, Middleware};
pub use routing::{MethodView, Router, UrlPatterns, View};
