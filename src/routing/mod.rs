//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (module load):
//!     Router::route / get / view / include_router
//!     → route.rs (Route entries, insertion order)
//!
//! Build (first call to Router::urls):
//!     Route[]
//!     → router.rs (group by path, merge single-method routes)
//!     → dispatch.rs (Endpoint per handler, Dispatcher per path)
//!     → urls.rs (UrlPatterns, nested per include)
//!
//! Per request (from the host):
//!     Dispatcher → Endpoint → handler pipeline → Response
//! ```
//!
//! # Design Decisions
//! - Tables are built once and read-only afterwards
//! - Path matching belongs to the host; this module only binds paths to dispatchers
//! - Allowed methods are reported in registration order (canonical order for views)

pub mod dispatch;
pub mod handler;
pub mod route;
pub mod router;
pub mod urls;
pub mod view;

pub use dispatch::{Dispatcher, Endpoint};
pub use handler::{boxed, BoxHandler, HandlerResult, IntoHandler, IntoHandlerResult};
pub use route::{FunctionRoute, IncludeRoute, Route, RouteOptions, ViewRoute};
pub use router::{RouteBuilder, Router, ViewBuilder};
pub use urls::{ResolvedRoute, ResolverMatch, UrlEntry, UrlPattern, UrlPatterns};
pub use view::{MethodView, View};
