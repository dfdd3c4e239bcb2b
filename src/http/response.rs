use std::path::{Path, PathBuf};

use async_trait::async_trait;
use http::{header, header::IntoHeaderName, HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;
use tokio::io::{self, AsyncWrite, AsyncWriteExt};

use super::{headers::HeaderMapExt, WriteHeaders};
use crate::{io::WriteFile, Error, Result};

const JSON: &str = "application/json; charset=utf-8";
const TEXT: &str = "text/plain; charset=utf-8";
const HTML: &str = "text/html; charset=utf-8";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Empty,
    Bytes(Vec<u8>),
    /// Streamed from disk when the response is written.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: Body::Empty,
        }
    }

    pub fn error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn with_content(content_type: &'static str, body: Vec<u8>) -> Self {
        Self::new(StatusCode::OK)
            .with_header(header::CONTENT_TYPE, HeaderValue::from_static(content_type))
            .with_body(Body::Bytes(body))
    }

    pub fn json<T: Serialize + ?Sized>(data: &T) -> Result<Self> {
        let payload = serde_json::to_vec(data)
            .map_err(|err| Error::configuration(format!("Failed to encode JSON response: {err}")))?;
        Ok(Self::with_content(JSON, payload))
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        Self::with_content(TEXT, text.into().into_bytes())
    }

    pub fn html<S: Into<String>>(html: S) -> Self {
        Self::with_content(HTML, html.into().into_bytes())
    }

    pub fn no_content() -> Self {
        Self::new(StatusCode::NO_CONTENT)
    }

    /// A response streaming the file at `path`. A missing file is a configuration error.
    pub fn file<P: AsRef<Path>>(path: P, content_type: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)
            .ok()
            .filter(|metadata| metadata.is_file())
            .ok_or_else(|| Error::configuration(format!("File not found: {}", path.display())))?;
        let content_type = match content_type {
            Some(content_type) => HeaderValue::from_str(content_type).map_err(|_| {
                Error::configuration(format!("Invalid content type: {content_type}"))
            })?,
            None => HeaderValue::from_static(content_type_for(path)),
        };
        Ok(Self::new(StatusCode::OK)
            .with_header(header::CONTENT_TYPE, content_type)
            .with_header(header::CONTENT_LENGTH, HeaderValue::from(metadata.len()))
            .with_body(Body::File(path.to_path_buf())))
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn with_header<K: IntoHeaderName>(mut self, key: K, value: HeaderValue) -> Self {
        self.headers.insert(key, value);
        self
    }

    pub fn with_body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// In-memory body bytes; empty for file and empty bodies.
    pub fn bytes(&self) -> &[u8] {
        match &self.body {
            Body::Bytes(bytes) => bytes,
            Body::Empty | Body::File(_) => &[],
        }
    }

    pub fn content_length(&self) -> Option<u64> {
        match &self.body {
            Body::Empty => Some(0),
            Body::Bytes(bytes) => Some(bytes.len() as u64),
            Body::File(_) => self
                .header_str(header::CONTENT_LENGTH)
                .and_then(|length| length.parse().ok()),
        }
    }
}

impl HeaderMapExt for Response {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

/// Content type guessed from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        "html" => HTML,
        _ => "application/octet-stream",
    }
}

#[async_trait]
pub trait WriteResponse {
    async fn write_response(&mut self, response: &Response) -> io::Result<()>;
}

#[async_trait]
impl<W> WriteResponse for W
where
    W: AsyncWrite + ?Sized + Unpin + Send,
{
    async fn write_response(&mut self, response: &Response) -> io::Result<()> {
        self.write_all(b"HTTP/1.1 ").await?;
        self.write_all(response.status.as_str().as_bytes()).await?;
        self.write_all(b" ").await?;
        if let Some(reason) = response.status.canonical_reason() {
            self.write_all(reason.as_bytes()).await?;
        }
        self.write_all(b"\r\n").await?;
        let mut headers = response.headers.clone();
        if let Some(length) = response.content_length() {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        }
        self.write_headers(&headers).await?;
        self.write_all(b"\r\n").await?;
        match &response.body {
            Body::Empty => {}
            Body::Bytes(bytes) => self.write_all(bytes).await?,
            Body::File(path) => {
                self.write_file(path).await?;
            }
        }
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn json_sets_content_type() {
        let response = Response::json(&json!({ "id": 1 })).unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header_str(header::CONTENT_TYPE), Some(JSON));
        assert_eq!(response.bytes(), br#"{"id":1}"#);
    }

    #[test]
    fn json_keeps_slashes_and_unicode() {
        let response = Response::json(&json!({ "path": "/a/b", "name": "čaj" })).unwrap();
        assert_eq!(
            String::from_utf8(response.bytes().to_vec()).unwrap(),
            r#"{"name":"čaj","path":"/a/b"}"#
        );
    }

    #[test]
    fn with_header_leaves_original_untouched() {
        let original = Response::text("hello");
        let modified = original
            .clone()
            .with_header(header::ALLOW, HeaderValue::from_static("GET"));
        assert_eq!(original.header(header::ALLOW), None);
        assert_eq!(modified.header_str(header::ALLOW), Some("GET"));
        assert_eq!(modified.header_str(header::CONTENT_TYPE), Some(TEXT));
    }

    #[test]
    fn no_content_is_empty() {
        let response = Response::no_content();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(response.body(), &Body::Empty);
        assert_eq!(response.content_length(), Some(0));
    }

    #[test]
    fn file_response_detects_content_type_and_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.CSS");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"body{}")
            .unwrap();
        let response = Response::file(&path, None).unwrap();
        assert_eq!(response.header_str(header::CONTENT_TYPE), Some("text/css"));
        assert_eq!(response.content_length(), Some(6));
        assert_eq!(response.body(), &Body::File(path));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let result = Response::file("/definitely/not/here.txt", None);
        assert!(matches!(result, Err(Error::Configuration(_))));
    }

    #[test]
    fn unknown_extensions_are_binary() {
        assert_eq!(content_type_for(Path::new("archive.tar.zst")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("index.html")), HTML);
        assert_eq!(content_type_for(Path::new("logo.JPEG")), "image/jpeg");
    }

    #[tokio::test]
    async fn writes_status_headers_and_body() {
        let response = Response::text("hi").with_status(StatusCode::ACCEPTED);
        let mut output = Vec::new();
        output.write_response(&response).await.unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.starts_with("HTTP/1.1 202 Accepted\r\n"));
        assert!(output.contains("content-length: 2\r\n"));
        assert!(output.ends_with("\r\n\r\nhi"));
    }
}
