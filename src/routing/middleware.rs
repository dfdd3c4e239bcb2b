use std::{collections::HashMap, sync::Arc};

use crate::{
    http::{Request, Response},
    routing::Next,
    Error, Result,
};

/// Name under which a middleware is registered and referenced by routes.
pub type MiddlewareId = String;

/// Middleware wraps everything registered after it on a route.
/// It can be used to run logic before and after the rest of the chain.
///
/// A middleware either forwards by calling [Next::run] (at most once, since
/// [Next] is consumed) and returns the downstream response, possibly changed,
/// or answers on its own without forwarding.
pub trait Middleware: Send + Sync {
    fn name(&self) -> &str;

    fn run(&self, request: &Request, next: Next<'_>) -> Result<Response>;
}

pub type MiddlewareService = Arc<dyn Middleware>;

/// Middleware instances by id, built once at startup.
#[derive(Default, Clone)]
pub struct MiddlewareRegistry(HashMap<MiddlewareId, MiddlewareService>);

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<M: Middleware + 'static>(mut self, id: &str, middleware: M) -> Self {
        self.0.insert(id.to_string(), Arc::new(middleware));
        self
    }

    pub fn get(&self, id: &str) -> Option<&MiddlewareService> {
        self.0.get(id)
    }

    /// Looks up every id in order. An unknown id is a configuration error.
    pub fn resolve(&self, ids: &[MiddlewareId]) -> Result<Box<[MiddlewareService]>> {
        ids.iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| Error::configuration(format!("Unknown middleware `{id}`")))
            })
            .collect()
    }
}
