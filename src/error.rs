use std::{fmt::Display, io};

use http::{Method, StatusCode};
use serde_json::{json, Value};

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a request from producing a response.
///
/// [Error::Routing] and [Error::Http] are ordinary outcomes that the
/// top-level boundary renders for the client. [Error::Configuration],
/// [Error::Storage] and [Error::Io] are programming or environment faults:
/// they are logged and answered with a generic 500.
#[derive(Debug)]
pub enum Error {
    Routing(RoutingError),
    Http(HttpError),
    Configuration(String),
    Storage(String),
    Io(io::Error),
}

impl Error {
    pub fn configuration<S: AsRef<str>>(message: S) -> Self {
        Self::Configuration(message.as_ref().to_string())
    }

    pub fn storage<S: AsRef<str>>(message: S) -> Self {
        Self::Storage(message.as_ref().to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Routing(error) => error.status(),
            Self::Http(error) => error.status(),
            Self::Configuration(_) | Self::Storage(_) | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Storage(_) | Self::Io(_))
    }
}

impl From<RoutingError> for Error {
    fn from(value: RoutingError) -> Self {
        Self::Routing(value)
    }
}

impl From<HttpError> for Error {
    fn from(value: HttpError) -> Self {
        Self::Http(value)
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Routing(error) => error.fmt(f),
            Self::Http(error) => error.fmt(f),
            Self::Configuration(message) => write!(f, "Configuration error: {message}"),
            Self::Storage(message) => write!(f, "Storage error: {message}"),
            Self::Io(error) => write!(f, "Io({error})"),
        }
    }
}

impl std::error::Error for Error {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    NotFound,
    MethodNotAllowed(Vec<Method>),
}

impl RoutingError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed(_) => "Method Not Allowed",
        }
    }

    pub fn payload(&self) -> Value {
        match self {
            Self::NotFound => json!({ "error": self.message() }),
            Self::MethodNotAllowed(methods) => json!({
                "error": self.message(),
                "allowed_methods": methods.iter().map(Method::as_str).collect::<Vec<_>>(),
            }),
        }
    }
}

impl Display for RoutingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.message().fmt(f)
    }
}

impl From<RoutingError> for HttpError {
    fn from(value: RoutingError) -> Self {
        HttpError::new(value.status(), value.message()).with_payload(value.payload())
    }
}

/// A user-facing failure raised by a handler or middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
    payload: Option<Value>,
}

impl HttpError {
    pub fn new<S: AsRef<str>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.as_ref().to_string(),
            payload: None,
        }
    }

    /// Error whose payload is `{"error": message}`.
    pub fn with_error_payload<S: AsRef<str>>(status: StatusCode, message: S) -> Self {
        let payload = json!({ "error": message.as_ref() });
        Self::new(status, message).with_payload(payload)
    }

    pub fn bad_request<S: AsRef<str>>(message: S) -> Self {
        Self::with_error_payload(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::with_error_payload(StatusCode::UNAUTHORIZED, "Unauthorized")
    }

    pub fn not_found<S: AsRef<str>>(message: S) -> Self {
        Self::with_error_payload(StatusCode::NOT_FOUND, message)
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// The body rendered for API clients.
    pub fn body(&self) -> Value {
        self.payload
            .clone()
            .unwrap_or_else(|| json!({ "error": self.message }))
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for HttpError {}
