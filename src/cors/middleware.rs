use std::sync::Arc;

use http::{header, Method};

use super::config::CorsConfig;
use crate::{
    http::{Request, Response},
    routing::{Middleware as TMiddleware, Next},
    Result,
};

/// Answers preflight requests directly and adds the CORS headers to every other response.
#[derive(Debug, Clone)]
pub struct Middleware {
    config: Arc<CorsConfig>,
}

impl Middleware {
    pub fn new(config: Arc<CorsConfig>) -> Self {
        Self { config }
    }

    /// Adds the configured `Access-Control-Allow-*` headers.
    pub fn apply(&self, response: Response) -> Response {
        apply(&self.config, response)
    }
}

pub fn apply(config: &CorsConfig, response: Response) -> Response {
    response
        .with_header(header::ACCESS_CONTROL_ALLOW_ORIGIN, config.allow_origin.clone())
        .with_header(header::ACCESS_CONTROL_ALLOW_METHODS, config.allow_methods.clone())
        .with_header(header::ACCESS_CONTROL_ALLOW_HEADERS, config.allow_headers.clone())
}

impl TMiddleware for Middleware {
    fn name(&self) -> &str {
        "cors"
    }

    fn run(&self, request: &Request, next: Next<'_>) -> Result<Response> {
        if *request.method() == Method::OPTIONS {
            return Ok(self.apply(Response::no_content()));
        }
        let response = next.run(request)?;
        Ok(self.apply(response))
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, StatusCode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        http::HeaderMapExt,
        routing::{MiddlewareService, Params},
        Error, HttpError,
    };

    fn middleware() -> Middleware {
        Middleware::new(Arc::new(
            CorsConfig::new("https://app.example", "GET, POST", "Content-Type").unwrap(),
        ))
    }

    fn run(request: Request, handler: &dyn crate::routing::Handler) -> Result<Response> {
        let chain: [MiddlewareService; 1] = [Arc::new(middleware())];
        let params = Params::new();
        Next::new(&chain, handler, &params).run(&request)
    }

    fn created(_: &Request, _: &Params) -> Result<Response> {
        Ok(Response::text("created").with_status(StatusCode::CREATED))
    }

    fn unreachable(_: &Request, _: &Params) -> Result<Response> {
        panic!("preflight must not reach the handler")
    }

    fn failing(_: &Request, _: &Params) -> Result<Response> {
        Err(HttpError::unauthorized().into())
    }

    #[test]
    fn preflight_is_answered_without_forwarding() {
        let response = run(Request::new(Method::OPTIONS, "/api/v1/todos"), &unreachable).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.header_str(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some("https://app.example")
        );
        assert_eq!(
            response.header_str(header::ACCESS_CONTROL_ALLOW_METHODS),
            Some("GET, POST")
        );
    }

    #[test]
    fn headers_are_added_after_the_handler() {
        let response = run(Request::new(Method::POST, "/api/v1/todos"), &created).unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.bytes(), b"created");
        assert_eq!(
            response.header_str(header::ACCESS_CONTROL_ALLOW_HEADERS),
            Some("Content-Type")
        );
    }

    #[test]
    fn errors_pass_through() {
        let result = run(Request::new(Method::GET, "/api/v1/seo"), &failing);
        assert!(matches!(result, Err(Error::Http(_))));
    }

    #[test]
    fn invalid_header_values_are_rejected() {
        assert!(CorsConfig::new("bad\nvalue", "GET", "X").is_err());
        assert_eq!(
            CorsConfig::default().allow_origin,
            HeaderValue::from_static("*")
        );
    }
}
