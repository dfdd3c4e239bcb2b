use std::slice::Iter;

use essentials::debug;

use crate::{
    http::{Request, Response},
    routing::{Handler, MiddlewareService, Params},
    utils::Also,
    Result,
};

/// The rest of a middleware chain: the middleware not yet entered and the route handler.
pub struct Next<'a> {
    it: Iter<'a, MiddlewareService>,
    handler: &'a dyn Handler,
    params: &'a Params,
}

impl<'a> Next<'a> {
    pub fn new(
        middleware: &'a [MiddlewareService],
        handler: &'a dyn Handler,
        params: &'a Params,
    ) -> Self {
        Self {
            it: middleware.iter(),
            handler,
            params,
        }
    }

    pub fn run(mut self, request: &Request) -> Result<Response> {
        match self.it.next() {
            Some(middleware) => {
                debug!(middleware = middleware.name(), method = %request.method(), path = request.path(), "-->");
                middleware.run(request, self).also(|r| {
                    debug!(middleware = middleware.name(), status = ?r.as_ref().map(Response::status), "<--")
                })
            }
            None => {
                debug!(method = %request.method(), path = request.path(), "--> handler");
                self.handler
                    .call(request, self.params)
                    .also(|r| debug!(status = ?r.as_ref().map(Response::status), "<-- handler"))
            }
        }
    }
}
