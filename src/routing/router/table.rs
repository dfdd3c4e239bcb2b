use std::fmt::Debug;

use http::Method;

use super::{Params, PathPattern};
use crate::routing::{HandlerService, MiddlewareId};

pub type Id = usize;

pub struct Route {
    pub method: Method,
    pub pattern: PathPattern,
    pub handler: HandlerService,
    pub middleware: Box<[MiddlewareId]>,
}

impl Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("path", &self.pattern.path())
            .field("middleware", &self.middleware)
            .finish()
    }
}

pub struct Fallback {
    pub handler: HandlerService,
    pub middleware: Box<[MiddlewareId]>,
}

impl Debug for Fallback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fallback")
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// Outcome of looking a request up in the [RouteTable].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Matched(Id, Params),
    /// The path matched only routes registered for other methods.
    MethodNotAllowed(Vec<Method>),
    Fallback,
    NotFound,
}

/// Routes in registration order, frozen once built.
#[derive(Debug)]
pub struct RouteTable {
    routes: Box<[Route]>,
    fallback: Option<Fallback>,
}

impl RouteTable {
    pub(crate) fn new(routes: Vec<Route>, fallback: Option<Fallback>) -> Self {
        Self {
            routes: routes.into_boxed_slice(),
            fallback,
        }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn route(&self, id: Id) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn fallback(&self) -> Option<&Fallback> {
        self.fallback.as_ref()
    }

    /// The first route matching both path and method wins. Routes matching only
    /// the path are collected as allowed methods and the scan goes on, so a later
    /// route with the same path and the requested method is still found.
    pub fn lookup(&self, method: &Method, path: &str) -> Lookup {
        let mut allowed: Vec<Method> = Vec::new();
        for (id, route) in self.routes.iter().enumerate() {
            let Some(params) = route.pattern.matches(path) else {
                continue;
            };
            if &route.method != method {
                if !allowed.contains(&route.method) {
                    allowed.push(route.method.clone());
                }
                continue;
            }
            return Lookup::Matched(id, params);
        }
        if !allowed.is_empty() {
            Lookup::MethodNotAllowed(allowed)
        } else if self.fallback.is_some() {
            Lookup::Fallback
        } else {
            Lookup::NotFound
        }
    }
}
