use std::time::Instant;

use essentials::{info, warn};

use crate::{
    http::{Request, Response},
    routing::{Middleware as TMiddleware, Next},
    Result,
};

/// Logs method, path, status and duration of every request passing through.
#[derive(Debug, Clone, Default)]
pub struct Middleware;

impl Middleware {
    pub fn new() -> Self {
        Self
    }
}

impl TMiddleware for Middleware {
    fn name(&self) -> &str {
        "logging"
    }

    fn run(&self, request: &Request, next: Next<'_>) -> Result<Response> {
        let started_at = Instant::now();
        let result = next.run(request);
        let elapsed = started_at.elapsed().as_millis();
        match &result {
            Ok(response) => info!(
                "[Request] {} {} {} {}ms",
                request.method(),
                request.path(),
                response.status().as_u16(),
                elapsed
            ),
            Err(error) => warn!(
                "[Request] {} {} {} {}ms ({})",
                request.method(),
                request.path(),
                error.status().as_u16(),
                elapsed,
                error
            ),
        }
        result
    }
}
