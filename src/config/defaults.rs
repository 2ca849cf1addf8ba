//! Process-wide routing defaults.
//!
//! Routers read these when they build, for every setting they do not
//! override themselves. The value is swapped atomically, so installing new
//! defaults never blocks readers; tables already built keep what they saw.

use std::sync::{Arc, LazyLock};

use arc_swap::ArcSwap;

use crate::exception_handler::{default_exception_handler, ExceptionHandler};
use crate::http::request::{default_request_class, RequestClass};
use crate::http::response::{default_response_class, ResponseClass};

#[derive(Clone)]
pub struct Defaults {
    pub request_class: RequestClass,
    pub response_class: ResponseClass,
    pub exception_handler: ExceptionHandler,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            request_class: default_request_class(),
            response_class: default_response_class(),
            exception_handler: default_exception_handler(),
        }
    }
}

impl std::fmt::Debug for Defaults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Defaults").finish_non_exhaustive()
    }
}

static DEFAULTS: LazyLock<ArcSwap<Defaults>> =
    LazyLock::new(|| ArcSwap::from_pointee(Defaults::default()));

pub fn defaults() -> Arc<Defaults> {
    DEFAULTS.load_full()
}

/// Replace the process defaults; affects routers built afterwards.
pub fn install_defaults(defaults: Defaults) {
    DEFAULTS.store(Arc::new(defaults));
    tracing::debug!("Installed routing defaults");
}

/// Restore the compiled-in defaults.
pub fn reset_defaults() {
    install_defaults(Defaults::default());
}
