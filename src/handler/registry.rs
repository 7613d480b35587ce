//! Handler registry for dispatching requests by relative path.
//!
//! # Design Decisions
//! - Populated once at startup, then shared read-only behind an `Arc`
//! - Exact path match, no prefixes or patterns
//! - Explicit `None` for unknown paths rather than a default handler

use std::collections::HashMap;
use std::sync::Arc;

use super::StreamHandler;

/// Registry mapping relative paths to handlers.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn StreamHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a path relative to the mount point.
    ///
    /// A later registration for the same path replaces the earlier one.
    pub fn register<H: StreamHandler>(&mut self, path: impl Into<String>, handler: H) -> &mut Self {
        let path = path.into();
        if self.handlers.insert(path.clone(), Arc::new(handler)).is_some() {
            tracing::warn!(path = %path, "Replacing previously registered stream handler");
        }
        self
    }

    /// Look up the handler for a relative path.
    pub fn resolve(&self, path: &str) -> Option<Arc<dyn StreamHandler>> {
        self.handlers.get(path).cloned()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("paths", &self.paths())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BoxFuture, HandlerResult};
    use crate::stream::DuplexStream;
    use axum::http::Method;

    struct Noop;

    impl StreamHandler for Noop {
        fn handle<'a>(
            &'a self,
            _method: &'a Method,
            _stream: &'a mut DuplexStream,
        ) -> BoxFuture<'a, HandlerResult> {
            Box::pin(async { Ok(()) })
        }
    }

    #[test]
    fn test_resolve_registered_path() {
        let mut registry = HandlerRegistry::new();
        registry.register("/bytes", Noop).register("/entity", Noop);

        assert!(registry.resolve("/bytes").is_some());
        assert!(registry.resolve("/entity").is_some());
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.paths(), vec!["/bytes", "/entity"]);
    }

    #[test]
    fn test_unknown_path_is_none() {
        let mut registry = HandlerRegistry::new();
        registry.register("/bytes", Noop);

        assert!(registry.resolve("/missing").is_none());
        assert!(registry.resolve("/bytes/").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = HandlerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.resolve("/").is_none());
    }
}
