pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use headers::{HeaderMapExt, ReadHeaders, WriteHeaders};
pub use request::{normalize_path, ReadRequest, Request};
pub use response::{content_type_for, Body, Response, WriteResponse};
