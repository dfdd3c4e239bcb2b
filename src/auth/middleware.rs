use std::sync::Arc;

use essentials::warn;

use super::config::AuthConfig;
use crate::{
    http::{Request, Response},
    routing::{Middleware as TMiddleware, Next},
    HttpError, Result,
};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Rejects requests whose `X-API-Key` header does not carry the configured key.
#[derive(Debug, Clone)]
pub struct Middleware {
    config: Arc<AuthConfig>,
}

impl Middleware {
    pub fn new(config: Arc<AuthConfig>) -> Self {
        Self { config }
    }
}

impl TMiddleware for Middleware {
    fn name(&self) -> &str {
        "auth"
    }

    fn run(&self, request: &Request, next: Next<'_>) -> Result<Response> {
        if !self.config.authenticate(request.header(API_KEY_HEADER)) {
            warn!(method = %request.method(), path = request.path(), "Rejected request with invalid API key");
            return Err(HttpError::unauthorized().into());
        }
        next.run(request)
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderValue, Method, StatusCode};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        routing::{Handler, MiddlewareService, Params},
        Error,
    };

    fn run(config: AuthConfig, request: Request) -> Result<Response> {
        let chain: [MiddlewareService; 1] = [Arc::new(Middleware::new(Arc::new(config)))];
        let handler = |_: &Request, _: &Params| -> Result<Response> { Ok(Response::text("allowed")) };
        let params = Params::new();
        Next::new(&chain, &handler as &dyn Handler, &params).run(&request)
    }

    fn request(key: Option<&'static str>) -> Request {
        let request = Request::new(Method::POST, "/api/v1/settings/seo-toggle");
        match key {
            Some(key) => request.with_header(API_KEY_HEADER, HeaderValue::from_static(key)),
            None => request,
        }
    }

    fn secured() -> AuthConfig {
        AuthConfig::new(Some("secret".to_string()))
    }

    #[test]
    fn empty_key_disables_check() {
        let response = run(AuthConfig::new(Some(String::new())), request(None)).unwrap();
        assert_eq!(response.bytes(), b"allowed");
    }

    #[test]
    fn matching_key_is_forwarded() {
        let response = run(secured(), request(Some("secret"))).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn missing_or_wrong_key_is_unauthorized() {
        for key in [None, Some("wrong"), Some("secret2"), Some("")] {
            match run(secured(), request(key)) {
                Err(Error::Http(error)) => {
                    assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
                    assert_eq!(error.body(), json!({ "error": "Unauthorized" }));
                }
                other => panic!("unexpected result for {key:?}: {other:?}"),
            }
        }
    }
}
