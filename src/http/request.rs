use std::{collections::HashMap, sync::OnceLock};

use async_trait::async_trait;
use http::{header, header::IntoHeaderName, HeaderMap, HeaderValue, Method};
use serde_json::Value;
use tokio::io::{self, AsyncBufRead, AsyncReadExt};

use super::{headers::HeaderMapExt, ReadHeaders};
use crate::{
    io::{
        error::{error, Body, RequestStatusLine},
        ReadLine, MAX_LINE_SIZE,
    },
    HttpError, Result,
};

/// Largest body the server will buffer for a single request.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// Normalizes a path to start with `/` and carry no trailing slash, except for the root.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/').trim_end_matches('/');
    format!("/{trimmed}")
}

/// An incoming request. Immutable once built; the JSON body is parsed on first use.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: HashMap<String, String>,
    headers: HeaderMap,
    body: Vec<u8>,
    json: OnceLock<Value>,
}

impl Request {
    /// Builds a request from a method and a request target such as `/todos/1?page=2`.
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };
        Self {
            method,
            path: normalize_path(path),
            query: url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
            headers: HeaderMap::new(),
            body: Vec::new(),
            json: OnceLock::new(),
        }
    }

    pub fn with_header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.insert_header(key, value);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self.json = OnceLock::new();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.header_str(key)
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.body
    }

    /// The body parsed as a JSON object or array. An empty body reads as `{}`.
    pub fn json(&self) -> Result<&Value> {
        if let Some(value) = self.json.get() {
            return Ok(value);
        }
        let value = parse_json(&self.body)?;
        Ok(self.json.get_or_init(|| value))
    }

    pub fn is_api_request(&self) -> bool {
        self.path.starts_with("/api")
    }
}

fn parse_json(body: &[u8]) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value) if value.is_object() || value.is_array() => Ok(value),
        _ => Err(HttpError::bad_request("Invalid JSON payload.").into()),
    }
}

#[async_trait]
pub trait ReadRequest {
    async fn read_request(&mut self) -> io::Result<Request>;
}

#[async_trait]
impl<R> ReadRequest for R
where
    R: AsyncBufRead + ?Sized + Unpin + Send,
{
    async fn read_request(&mut self) -> io::Result<Request> {
        let status_line = self
            .read_line_capped(MAX_LINE_SIZE)
            .await?
            .ok_or(error(RequestStatusLine::MissingStatusLine))?;
        let status_line = String::from_utf8_lossy(&status_line);
        let (method, target) = {
            let mut parts = status_line.split_whitespace();
            let method: Method = parts
                .next()
                .ok_or(error(RequestStatusLine::MissingMethod))?
                .to_uppercase()
                .parse()
                .map_err(|_| error(RequestStatusLine::InvalidMethod))?;
            let target = parts
                .next()
                .ok_or(error(RequestStatusLine::MissingPath))?
                .to_string();
            parts
                .next()
                .ok_or(error(RequestStatusLine::MissingVersion))?;
            (method, target)
        };
        let headers = self.read_headers().await?;
        let length = match headers.get(header::CONTENT_LENGTH) {
            Some(value) => value
                .to_str()
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .ok_or(error(Body::InvalidContentLength))?,
            None => 0,
        };
        if length > MAX_BODY_SIZE {
            return Err(error(Body::TooLarge(length)));
        }
        let mut body = vec![0; length];
        self.read_exact(&mut body).await?;
        Ok(Request::new(method, &target)
            .with_headers(headers)
            .with_body(body))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn normalizes_paths() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("//"), "/");
        assert_eq!(normalize_path("todos"), "/todos");
        assert_eq!(normalize_path("/todos/"), "/todos");
        assert_eq!(normalize_path("/api//v1/"), "/api//v1");
    }

    #[test]
    fn splits_target_into_path_and_query() {
        let request = Request::new(Method::GET, "/todos/?page=2&q=a+b%21");
        assert_eq!(request.path(), "/todos");
        assert_eq!(request.query("page"), Some("2"));
        assert_eq!(request.query("q"), Some("a b!"));
        assert_eq!(request.query("missing"), None);
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let request = Request::new(Method::GET, "/")
            .with_header("X-API-Key", HeaderValue::from_static("secret"));
        assert_eq!(request.header("x-api-key"), Some("secret"));
        assert_eq!(request.header("X-Api-Key"), Some("secret"));
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        let request = Request::new(Method::POST, "/todos");
        assert_eq!(request.json().unwrap(), &json!({}));
    }

    #[test]
    fn json_body_is_parsed_once() {
        let request = Request::new(Method::POST, "/todos").with_body(r#"{"title":"Write"}"#);
        let first = request.json().unwrap() as *const Value;
        let second = request.json().unwrap() as *const Value;
        assert_eq!(first, second);
        assert_eq!(request.json().unwrap()["title"], "Write");
    }

    #[test]
    fn scalar_or_broken_json_is_rejected() {
        for body in ["42", "\"text\"", "{broken"] {
            let request = Request::new(Method::POST, "/todos").with_body(body);
            match request.json() {
                Err(crate::Error::Http(error)) => {
                    assert_eq!(error.status(), http::StatusCode::BAD_REQUEST);
                    assert_eq!(error.message(), "Invalid JSON payload.");
                }
                other => panic!("unexpected result for {body}: {other:?}"),
            }
        }
    }

    #[test]
    fn api_requests_are_detected_by_prefix() {
        assert!(Request::new(Method::GET, "/api/v1/todos").is_api_request());
        assert!(!Request::new(Method::GET, "/about").is_api_request());
    }

    #[tokio::test]
    async fn reads_request_with_body() {
        let mut input: &[u8] =
            b"post /api/v1/todos?x=1 HTTP/1.1\r\nContent-Length: 16\r\nHost: local\r\n\r\n{\"title\":\"Nap\"}\n";
        let request = input.read_request().await.unwrap();
        assert_eq!(request.method(), &Method::POST);
        assert_eq!(request.path(), "/api/v1/todos");
        assert_eq!(request.query("x"), Some("1"));
        assert_eq!(request.header("host"), Some("local"));
        assert_eq!(request.json().unwrap(), &json!({ "title": "Nap" }));
    }

    #[tokio::test]
    async fn rejects_oversized_status_line() {
        let line = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(MAX_LINE_SIZE));
        let mut input: &[u8] = line.as_bytes();
        let err = input.read_request().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn rejects_missing_version() {
        let mut input: &[u8] = b"GET /\r\n\r\n";
        assert!(input.read_request().await.is_err());
    }
}
