use std::sync::Arc;

use http::Method;

use super::{Fallback, PathPattern, Route, RouteTable};
use crate::{
    http::normalize_path,
    routing::{Handler, HandlerService, MiddlewareId},
    Result,
};

struct RouteDefinition {
    method: Method,
    path: String,
    handler: HandlerService,
    middleware: Vec<MiddlewareId>,
}

fn join(prefix: &str, path: &str) -> String {
    normalize_path(&format!("{prefix}/{}", path.trim_matches('/')))
}

/// Collects routes while tracking the prefix and middleware of the enclosing groups.
///
/// ```
/// use http::Method;
/// use taskflow::{routing::{Params, RouterBuilder}, http::{Request, Response}, Result};
///
/// fn list(_: &Request, _: &Params) -> Result<Response> {
///     Ok(Response::text("todos"))
/// }
///
/// let table = RouterBuilder::new()
///     .group("/api", &["cors"], |api| api.group("/v1", &[], |v1| v1.get("/todos", list)))
///     .build()
///     .unwrap();
/// assert_eq!(table.routes()[0].pattern.path(), "/api/v1/todos");
/// assert_eq!(table.routes()[0].method, Method::GET);
/// ```
#[derive(Default)]
pub struct RouterBuilder {
    routes: Vec<RouteDefinition>,
    fallback: Option<Fallback>,
    prefix: String,
    middleware: Vec<MiddlewareId>,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route<H: Handler + 'static>(mut self, method: Method, path: &str, handler: H) -> Self {
        self.routes.push(RouteDefinition {
            method,
            path: join(&self.prefix, path),
            handler: Arc::new(handler),
            middleware: self.middleware.clone(),
        });
        self
    }

    pub fn get<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::GET, path, handler)
    }

    pub fn post<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::POST, path, handler)
    }

    pub fn put<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::PUT, path, handler)
    }

    pub fn patch<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::PATCH, path, handler)
    }

    pub fn delete<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::DELETE, path, handler)
    }

    pub fn options<H: Handler + 'static>(self, path: &str, handler: H) -> Self {
        self.route(Method::OPTIONS, path, handler)
    }

    /// Registers the routes added by `routes` under `prefix`, wrapped in the
    /// enclosing middleware followed by `middleware`. The previous prefix and
    /// middleware are restored afterwards.
    pub fn group<F>(mut self, prefix: &str, middleware: &[&str], routes: F) -> Self
    where
        F: FnOnce(Self) -> Self,
    {
        let joined = join(&self.prefix, prefix);
        let previous_prefix = std::mem::replace(
            &mut self.prefix,
            if joined == "/" { String::new() } else { joined },
        );
        let previous_middleware = self.middleware.len();
        self.middleware
            .extend(middleware.iter().map(|id| id.to_string()));
        let mut builder = routes(self);
        builder.prefix = previous_prefix;
        builder.middleware.truncate(previous_middleware);
        builder
    }

    /// Sets the handler used when no route matches. Only the last one is kept.
    pub fn fallback<H: Handler + 'static>(mut self, handler: H) -> Self {
        self.fallback = Some(Fallback {
            handler: Arc::new(handler),
            middleware: self.middleware.clone().into_boxed_slice(),
        });
        self
    }

    pub fn build(self) -> Result<RouteTable> {
        let routes = self
            .routes
            .into_iter()
            .map(|definition| {
                Ok(Route {
                    method: definition.method,
                    pattern: PathPattern::compile(&definition.path)?,
                    handler: definition.handler,
                    middleware: definition.middleware.into_boxed_slice(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(RouteTable::new(routes, self.fallback))
    }
}
