use std::fmt::Display;

use http::header::{InvalidHeaderName, InvalidHeaderValue};
use tokio::io;

pub fn error<E: Into<WireError>>(data: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, data.into())
}

/// Malformed HTTP/1.1 input read from a client connection.
#[derive(Debug)]
pub enum WireError {
    RequestStatusLine(RequestStatusLine),
    Headers(Headers),
    Body(Body),
    Line(Line),
}

impl Display for WireError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for WireError {}

#[derive(Debug)]
pub enum RequestStatusLine {
    MissingStatusLine,
    MissingMethod,
    MissingPath,
    MissingVersion,
    InvalidMethod,
}

impl From<RequestStatusLine> for WireError {
    fn from(value: RequestStatusLine) -> Self {
        WireError::RequestStatusLine(value)
    }
}

#[derive(Debug)]
pub enum Headers {
    InvalidName(InvalidHeaderName),
    InvalidValue(InvalidHeaderValue),
    UnexpectedEof,
}

impl From<Headers> for WireError {
    fn from(value: Headers) -> Self {
        WireError::Headers(value)
    }
}

#[derive(Debug)]
pub enum Body {
    InvalidContentLength,
    TooLarge(usize),
}

impl From<Body> for WireError {
    fn from(value: Body) -> Self {
        WireError::Body(value)
    }
}

#[derive(Debug)]
pub enum Line {
    TooLong(usize),
}

impl From<Line> for WireError {
    fn from(value: Line) -> Self {
        WireError::Line(value)
    }
}
