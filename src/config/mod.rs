//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!
//! [apirouter] identifiers
//!     → registry.rs (identifier → component)
//!     → defaults.rs (atomic swap of the process-wide Defaults)
//!     → read by every Router when it builds
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Components are chosen by name from an explicit registry, never loaded dynamically

pub mod defaults;
pub mod loader;
pub mod registry;
pub mod schema;
pub mod validation;

pub use defaults::{defaults, install_defaults, reset_defaults, Defaults};
pub use loader::{load_config, parse_config, ConfigError};
pub use registry::Registry;
pub use schema::{AppConfig, ObservabilityConfig, RouterSettings, ServerConfig};
