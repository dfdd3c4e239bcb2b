use crate::{
    http::{Request, Response},
    routing::{Handler, MiddlewareService, Next, Params},
    Result,
};

/// A middleware list composed around a terminal handler.
///
/// For middleware `[A, B, C]` and handler `H` the request passes
/// `A -> B -> C -> H` and the response travels back `H -> C -> B -> A`.
pub struct Pipeline<'a> {
    middleware: &'a [MiddlewareService],
    handler: &'a dyn Handler,
}

impl<'a> Pipeline<'a> {
    pub fn new(middleware: &'a [MiddlewareService], handler: &'a dyn Handler) -> Self {
        Self {
            middleware,
            handler,
        }
    }

    pub fn run(&self, request: &Request, params: &Params) -> Result<Response> {
        Next::new(self.middleware, self.handler, params).run(request)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use http::{HeaderValue, Method};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{http::HeaderMapExt, routing::Middleware};

    struct Tag(&'static str);

    impl Middleware for Tag {
        fn name(&self) -> &str {
            self.0
        }

        fn run(&self, request: &Request, next: Next<'_>) -> Result<Response> {
            let response = next.run(request)?;
            let trail = match response.header_str("x-trail") {
                Some(trail) => format!("{trail},{}", self.0),
                None => self.0.to_string(),
            };
            let trail = HeaderValue::from_str(&trail).map_err(|_| crate::Error::configuration("trail"))?;
            Ok(response.with_header("x-trail", trail))
        }
    }

    fn echo(_: &Request, params: &Params) -> Result<Response> {
        Ok(Response::text(params.get("name").unwrap_or_default().to_string()))
    }

    #[test]
    fn response_unwinds_through_middleware_in_reverse() {
        let middleware: [MiddlewareService; 2] = [Arc::new(Tag("outer")), Arc::new(Tag("inner"))];
        let params = Params::from_iter([("name", "pipeline")]);
        let request = Request::new(Method::GET, "/");
        let response = Pipeline::new(&middleware, &echo).run(&request, &params).unwrap();
        assert_eq!(response.bytes(), b"pipeline");
        assert_eq!(response.header_str("x-trail"), Some("inner,outer"));
    }

    #[test]
    fn empty_pipeline_calls_handler() {
        let params = Params::new();
        let request = Request::new(Method::GET, "/");
        let response = Pipeline::new(&[], &echo).run(&request, &params).unwrap();
        assert_eq!(response.bytes(), b"");
    }
}
