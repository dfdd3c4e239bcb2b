use essentials::debug;
use http::{header, HeaderValue, Method};

use crate::{
    http::{Request, Response},
    routing::{
        Lookup, MiddlewareRegistry, MiddlewareService, Params, Pipeline, RouteTable,
    },
    Error, Result, RoutingError,
};

/// Joins methods into an `Allow` header value, e.g. `GET, POST`.
pub fn allow_header(methods: &[Method]) -> Result<HeaderValue> {
    let value = methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&value)
        .map_err(|_| Error::configuration(format!("Invalid Allow header: {value}")))
}

/// Routes requests through the route table and the middleware of the matched route.
///
/// Middleware ids are resolved against the registry when the dispatcher is
/// built, so a route naming an unknown middleware fails at startup instead of
/// on the first request.
pub struct Dispatcher {
    table: RouteTable,
    middleware: Box<[Box<[MiddlewareService]>]>,
    fallback: Option<Box<[MiddlewareService]>>,
}

impl Dispatcher {
    pub fn new(table: RouteTable, registry: &MiddlewareRegistry) -> Result<Self> {
        let middleware = table
            .routes()
            .iter()
            .map(|route| registry.resolve(&route.middleware))
            .collect::<Result<Vec<_>>>()?
            .into_boxed_slice();
        let fallback = table
            .fallback()
            .map(|fallback| registry.resolve(&fallback.middleware))
            .transpose()?;
        Ok(Self {
            table,
            middleware,
            fallback,
        })
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn dispatch(&self, request: &Request) -> Result<Response> {
        match self.table.lookup(request.method(), request.path()) {
            Lookup::Matched(id, params) => {
                let route = &self.table.routes()[id];
                debug!(route = id, method = %route.method, pattern = route.pattern.path(), "Matched route");
                Pipeline::new(&self.middleware[id], route.handler.as_ref()).run(request, &params)
            }
            Lookup::MethodNotAllowed(methods) => {
                debug!(path = request.path(), allowed = ?methods, "Method not allowed");
                if *request.method() == Method::OPTIONS {
                    return Ok(Response::no_content().with_header(header::ALLOW, allow_header(&methods)?));
                }
                Err(RoutingError::MethodNotAllowed(methods).into())
            }
            Lookup::Fallback => match (self.table.fallback(), &self.fallback) {
                (Some(fallback), Some(middleware)) => {
                    debug!(path = request.path(), "Using fallback");
                    Pipeline::new(middleware, fallback.handler.as_ref()).run(request, &Params::new())
                }
                _ => Err(RoutingError::NotFound.into()),
            },
            Lookup::NotFound => {
                debug!(path = request.path(), "No route found");
                Err(RoutingError::NotFound.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use http::StatusCode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        http::HeaderMapExt,
        routing::{Middleware, Next, RouterBuilder},
        HttpError,
    };

    type Log = Arc<Mutex<Vec<String>>>;

    struct Recorder {
        name: &'static str,
        log: Log,
    }

    impl Middleware for Recorder {
        fn name(&self) -> &str {
            self.name
        }

        fn run(&self, request: &Request, next: Next<'_>) -> Result<Response> {
            self.log.lock().unwrap().push(format!("{} in", self.name));
            let response = next.run(request);
            let status = match &response {
                Ok(response) => response.status(),
                Err(error) => error.status(),
            };
            self.log
                .lock()
                .unwrap()
                .push(format!("{} out {}", self.name, status.as_u16()));
            response
        }
    }

    struct Deny;

    impl Middleware for Deny {
        fn name(&self) -> &str {
            "deny"
        }

        fn run(&self, _: &Request, _: Next<'_>) -> Result<Response> {
            Err(HttpError::unauthorized().into())
        }
    }

    fn recorder(name: &'static str, log: &Log) -> Recorder {
        Recorder {
            name,
            log: log.clone(),
        }
    }

    fn handler(log: &Log) -> impl Fn(&Request, &Params) -> Result<Response> + Send + Sync {
        let log = log.clone();
        move |_: &Request, params: &Params| -> Result<Response> {
            log.lock().unwrap().push("handler".to_string());
            Ok(Response::text(params.get("id").unwrap_or("none").to_string()))
        }
    }

    fn ok(_: &Request, _: &Params) -> Result<Response> {
        Ok(Response::text("ok"))
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[test]
    fn runs_middleware_in_order_and_unwinds_in_reverse() {
        let log = Log::default();
        let registry = MiddlewareRegistry::new()
            .register("a", recorder("a", &log))
            .register("b", recorder("b", &log))
            .register("c", recorder("c", &log));
        let table = RouterBuilder::new()
            .group("", &["a", "b"], |group| {
                group.group("", &["c"], |group| group.get("/todos/{id}", handler(&log)))
            })
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(table, &registry).unwrap();

        let response = dispatcher
            .dispatch(&Request::new(Method::GET, "/todos/42"))
            .unwrap();

        assert_eq!(response.bytes(), b"42");
        assert_eq!(
            entries(&log),
            vec!["a in", "b in", "c in", "handler", "c out 200", "b out 200", "a out 200"]
        );
    }

    #[test]
    fn short_circuit_skips_handler_but_outer_middleware_sees_it() {
        let log = Log::default();
        let registry = MiddlewareRegistry::new()
            .register("logging", recorder("logging", &log))
            .register("auth", Deny);
        let table = RouterBuilder::new()
            .group("", &["logging", "auth"], |group| group.get("/secret", handler(&log)))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(table, &registry).unwrap();

        let result = dispatcher.dispatch(&Request::new(Method::GET, "/secret"));

        assert!(matches!(result, Err(Error::Http(ref error)) if error.status() == StatusCode::UNAUTHORIZED));
        assert_eq!(entries(&log), vec!["logging in", "logging out 401"]);
    }

    #[test]
    fn method_mismatch_reports_allowed_methods() {
        let table = RouterBuilder::new().get("/x", ok).post("/x", ok).build().unwrap();
        let dispatcher = Dispatcher::new(table, &MiddlewareRegistry::new()).unwrap();

        let result = dispatcher.dispatch(&Request::new(Method::DELETE, "/x"));

        match result {
            Err(Error::Routing(RoutingError::MethodNotAllowed(methods))) => {
                assert_eq!(methods, vec![Method::GET, Method::POST])
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn options_on_method_mismatch_lists_allowed_methods() {
        let table = RouterBuilder::new().get("/x", ok).post("/x", ok).build().unwrap();
        let dispatcher = Dispatcher::new(table, &MiddlewareRegistry::new()).unwrap();

        let response = dispatcher
            .dispatch(&Request::new(Method::OPTIONS, "/x"))
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.header_str(header::ALLOW), Some("GET, POST"));
    }

    #[test]
    fn no_route_and_no_fallback_is_not_found() {
        let dispatcher =
            Dispatcher::new(RouterBuilder::new().build().unwrap(), &MiddlewareRegistry::new())
                .unwrap();
        let result = dispatcher.dispatch(&Request::new(Method::GET, "/anything"));
        assert!(matches!(result, Err(Error::Routing(RoutingError::NotFound))));
    }

    #[test]
    fn fallback_runs_with_its_middleware() {
        let log = Log::default();
        let registry = MiddlewareRegistry::new().register("a", recorder("a", &log));
        let table = RouterBuilder::new()
            .get("/x", ok)
            .group("", &["a"], |group| group.fallback(handler(&log)))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(table, &registry).unwrap();

        let response = dispatcher
            .dispatch(&Request::new(Method::GET, "/missing"))
            .unwrap();

        assert_eq!(response.bytes(), b"none");
        assert_eq!(entries(&log), vec!["a in", "handler", "a out 200"]);
    }

    #[test]
    fn unknown_middleware_fails_to_build() {
        let table = RouterBuilder::new()
            .group("", &["missing"], |group| group.get("/x", ok))
            .build()
            .unwrap();
        let result = Dispatcher::new(table, &MiddlewareRegistry::new());
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn same_request_twice_gives_same_response() {
        let table = RouterBuilder::new()
            .get("/todos/{id}", |_: &Request, params: &Params| -> Result<Response> {
                Response::json(&serde_json::json!({ "id": params.get("id") }))
            })
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(table, &MiddlewareRegistry::new()).unwrap();
        let request = Request::new(Method::GET, "/todos/7");

        let first = dispatcher.dispatch(&request).unwrap();
        let second = dispatcher.dispatch(&request).unwrap();

        assert_eq!(first, second);
    }
}
