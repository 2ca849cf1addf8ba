//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers, body buffering)
//!     → [routing layer picks the dispatcher by path]
//!     → request.rs (façade over the buffered request)
//!     → handler
//!     → response.rs (coerce return value, add headers)
//!     → Send to client
//! ```

pub mod query;
pub mod request;
pub mod response;
pub mod server;

pub use query::QueryDict;
pub use request::{RawRequest, Request, RequestClass, Session, UploadedFile, UploadedFiles, User};
pub use response::{text, JsonResponse, Reply, Response, ResponseClass, TextResponse};
pub use server::HttpServer;
