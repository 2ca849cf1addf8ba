//! Built URL tables: what a router compiles into and what the host mounts.
//!
//! # Responsibilities
//! - Hold the ordered path → dispatcher bindings of one router
//! - Nest included tables under their prefix and namespace
//! - Flatten to absolute paths for mounting
//! - Reverse a namespaced route name back into a path
//!
//! # Design Decisions
//! - Path syntax is the host's (`{param}`, `{*rest}`); nothing here matches paths
//! - Names are namespaced by every named router on the way down (`outer:inner:name`)

use std::sync::Arc;

use crate::error::ReverseError;
use crate::routing::dispatch::Dispatcher;

/// Route match attached to the raw request by the hosting adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolverMatch {
    /// Absolute path pattern that matched.
    pub route: String,
    pub url_name: Option<String>,
    pub params: Vec<(String, String)>,
}

impl ResolverMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// One path bound to its dispatcher.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    pub path: String,
    pub dispatcher: Dispatcher,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub enum UrlEntry {
    Pattern(UrlPattern),
    Include {
        prefix: String,
        patterns: Arc<UrlPatterns>,
    },
}

/// The built table of one router.
#[derive(Debug, Clone, Default)]
pub struct UrlPatterns {
    namespace: Option<String>,
    entries: Vec<UrlEntry>,
}

/// A flattened binding with its absolute path and fully qualified name.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub path: String,
    pub dispatcher: Dispatcher,
    pub name: Option<String>,
}

impl UrlPatterns {
    pub fn new(namespace: Option<String>, entries: Vec<UrlEntry>) -> Self {
        Self { namespace, entries }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn entries(&self) -> &[UrlEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten to absolute paths, depth first, in table order.
    pub fn resolve(&self) -> Vec<ResolvedRoute> {
        let mut resolved = Vec::new();
        self.collect("", &[], &mut resolved);
        resolved
    }

    fn collect(&self, prefix: &str, namespaces: &[&str], out: &mut Vec<ResolvedRoute>) {
        let mut namespaces = namespaces.to_vec();
        if let Some(namespace) = self.namespace.as_deref() {
            namespaces.push(namespace);
        }

        for entry in &self.entries {
            match entry {
                UrlEntry::Pattern(pattern) => out.push(ResolvedRoute {
                    path: format!("/{}{}", prefix, pattern.path),
                    dispatcher: pattern.dispatcher.clone(),
                    name: pattern
                        .name
                        .as_deref()
                        .map(|name| qualify(&namespaces, name)),
                }),
                UrlEntry::Include {
                    prefix: include_prefix,
                    patterns,
                } => {
                    let nested = format!("{}{}", prefix, include_prefix);
                    patterns.collect(&nested, &namespaces, out);
                }
            }
        }
    }

    /// Absolute path of the route called `name`, with `{param}` segments filled in.
    pub fn reverse(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ReverseError> {
        let route = self
            .resolve()
            .into_iter()
            .find(|route| route.name.as_deref() == Some(name))
            .ok_or_else(|| ReverseError::NoMatch(name.to_string()))?;
        substitute(&route.path, params).map_err(|param| ReverseError::MissingParam {
            name: name.to_string(),
            param,
        })
    }
}

fn qualify(namespaces: &[&str], name: &str) -> String {
    let mut parts = namespaces.to_vec();
    parts.push(name);
    parts.join(":")
}

/// Replace each `{param}` (or `{*param}`) with its value; `Err` names the first missing one.
fn substitute(path: &str, params: &[(&str, &str)]) -> Result<String, String> {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('}') else {
            out.push_str(&rest[open..]);
            return Ok(out);
        };
        let key = rest[open + 1..open + close].trim_start_matches('*');
        let value = params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
            .ok_or_else(|| key.to_string())?;
        out.push_str(value);
        rest = &rest[open + close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}
