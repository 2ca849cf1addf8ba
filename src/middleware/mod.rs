//! Cross-cutting wrappers around route handlers.
//!
//! # Data Flow
//! ```text
//! exception boundary (exception_handler)
//!     → legacy middleware: process_request (declared order)
//!         → decorators: router-level, then route-level (first = outermost)
//!             → handler
//!         → response coercion (response class)
//!     → legacy middleware: process_response (reverse order)
//! ```
//!
//! # Design Decisions
//! - Decorators see the handler's raw [`Reply`](crate::http::Reply), before coercion
//! - Legacy middleware sees finished responses only
//! - Neither layer translates errors; that happens once, outside both

pub mod decorators;
pub mod legacy;

pub use decorators::{compose, decorator, Decorator};
pub use legacy::{Middleware, SetResponseHeader};
