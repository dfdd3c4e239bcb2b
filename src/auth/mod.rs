mod config;
mod middleware;

pub use config::AuthConfig;
pub use middleware::{Middleware, API_KEY_HEADER};
