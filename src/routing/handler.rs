use std::sync::Arc;

use crate::{
    http::{Request, Response},
    routing::Params,
    Result,
};

/// The terminal step of a route: turns a request and its path parameters into a response.
///
/// Closures with the matching signature are handlers, so routes are usually
/// registered with a closure that captures whatever the handler needs.
pub trait Handler: Send + Sync {
    fn call(&self, request: &Request, params: &Params) -> Result<Response>;
}

impl<F> Handler for F
where
    F: Fn(&Request, &Params) -> Result<Response> + Send + Sync,
{
    fn call(&self, request: &Request, params: &Params) -> Result<Response> {
        self(request, params)
    }
}

pub type HandlerService = Arc<dyn Handler>;

/// Binds a method of a shared controller as a handler.
pub fn action<C>(
    controller: &Arc<C>,
    method: fn(&C, &Request, &Params) -> Result<Response>,
) -> impl Handler
where
    C: Send + Sync + 'static,
{
    let controller = controller.clone();
    move |request: &Request, params: &Params| -> Result<Response> {
        method(&controller, request, params)
    }
}
