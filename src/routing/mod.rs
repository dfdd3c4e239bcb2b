//! Request routing and middleware dispatch.
//!
//! Routes are collected with a [RouterBuilder], frozen into a [RouteTable]
//! and handed to a [Dispatcher] together with the [MiddlewareRegistry] that
//! resolves the middleware ids the routes refer to.

pub mod dispatcher;
pub mod handler;
pub mod middleware;
pub mod next;
pub mod pipeline;
pub mod router;

pub use dispatcher::{allow_header, Dispatcher};
pub use handler::{action, Handler, HandlerService};
pub use middleware::{Middleware, MiddlewareId, MiddlewareRegistry, MiddlewareService};
pub use next::Next;
pub use pipeline::Pipeline;
pub use router::{Fallback, Id, Lookup, Params, PathPattern, Route, RouteTable, RouterBuilder};
