//! TaskFlow: a todo API and single page application host built on a small
//! routing core.
//!
//! Routes are grouped with shared prefixes and middleware, dispatched through
//! an ordered middleware pipeline, and every outcome is rendered by the
//! [App] boundary.
//!
//! # Example usage
//!
//! ```
//! use http::Method;
//! use taskflow::{http::Request, Config};
//!
//! let app = taskflow::builder(Config::default()).build_app().unwrap();
//!
//! let response = app.handle(
//!     &Request::new(Method::POST, "/api/v1/todos").with_body(r#"{"title":"Buy milk"}"#),
//! );
//! assert_eq!(response.status(), 201);
//!
//! let response = app.handle(&Request::new(Method::GET, "/api/v1/todos/1"));
//! assert_eq!(response.status(), 200);
//! ```
pub mod api;
pub mod auth;
pub mod config;
pub mod cors;
mod error;
pub mod frontend;
pub mod http;
pub mod io;
pub mod logging;
pub mod routing;
pub mod server;
pub mod store;
pub(crate) mod utils;
pub mod validation;

pub use config::Config;
pub use error::{Error, HttpError, Result, RoutingError};
pub use server::{builder, App, Server, ServerBuilder};
