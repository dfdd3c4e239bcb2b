use anyhow::{Context, Result};
use http::HeaderValue;

pub const DEFAULT_ALLOW_ORIGIN: &str = "*";
pub const DEFAULT_ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With, X-API-Key";

/// Values of the `Access-Control-Allow-*` headers added to API responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allow_origin: HeaderValue,
    pub allow_methods: HeaderValue,
    pub allow_headers: HeaderValue,
}

impl CorsConfig {
    pub fn new(allow_origin: &str, allow_methods: &str, allow_headers: &str) -> Result<Self> {
        Ok(Self {
            allow_origin: HeaderValue::from_str(allow_origin)
                .with_context(|| format!("Invalid CORS allowed origin: {allow_origin}"))?,
            allow_methods: HeaderValue::from_str(allow_methods)
                .with_context(|| format!("Invalid CORS allowed methods: {allow_methods}"))?,
            allow_headers: HeaderValue::from_str(allow_headers)
                .with_context(|| format!("Invalid CORS allowed headers: {allow_headers}"))?,
        })
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: HeaderValue::from_static(DEFAULT_ALLOW_ORIGIN),
            allow_methods: HeaderValue::from_static(DEFAULT_ALLOW_METHODS),
            allow_headers: HeaderValue::from_static(DEFAULT_ALLOW_HEADERS),
        }
    }
}
