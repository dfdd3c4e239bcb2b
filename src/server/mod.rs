pub mod app;
pub mod handler;
pub mod routes;

pub use app::{builder, App, Server, ServerBuilder};
pub use handler::AppHandler;
