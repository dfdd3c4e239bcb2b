use async_trait::async_trait;
use http::{header::AsHeaderName, header::IntoHeaderName, HeaderMap, HeaderName, HeaderValue};
use tokio::io::{self, AsyncBufRead, AsyncWrite, AsyncWriteExt};

use crate::io::{
    error::{error, Headers},
    ReadLine, MAX_LINE_SIZE,
};

pub trait HeaderMapExt {
    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn header<K: AsHeaderName>(&self, key: K) -> Option<&HeaderValue> {
        self.headers().get(key)
    }

    /// Header value as text; values that are not visible ASCII are ignored.
    fn header_str<K: AsHeaderName>(&self, key: K) -> Option<&str> {
        self.header(key).and_then(|value| value.to_str().ok())
    }

    fn insert_header<K: IntoHeaderName>(&mut self, key: K, value: HeaderValue) {
        self.headers_mut().insert(key, value);
    }

    fn remove_header<K: AsHeaderName>(&mut self, key: K) -> Option<HeaderValue> {
        self.headers_mut().remove(key)
    }
}

impl HeaderMapExt for HeaderMap {
    fn headers(&self) -> &HeaderMap {
        self
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        self
    }
}

#[async_trait]
pub trait WriteHeaders {
    async fn write_headers(&mut self, headers: &HeaderMap) -> io::Result<()>;
}

#[async_trait]
impl<R> WriteHeaders for R
where
    R: AsyncWrite + ?Sized + Unpin + Send,
{
    async fn write_headers(&mut self, headers: &HeaderMap) -> io::Result<()> {
        for (key, value) in headers {
            self.write_all(key.as_str().as_bytes()).await?;
            self.write_all(b": ").await?;
            self.write_all(value.as_bytes()).await?;
            self.write_all(b"\r\n").await?;
        }
        Ok(())
    }
}

#[async_trait]
pub trait ReadHeaders {
    async fn read_headers(&mut self) -> io::Result<HeaderMap>;
}

#[async_trait]
impl<R> ReadHeaders for R
where
    R: AsyncBufRead + ?Sized + Unpin + Send,
{
    async fn read_headers(&mut self) -> io::Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        loop {
            let line = self
                .read_line_capped(MAX_LINE_SIZE)
                .await?
                .ok_or(error(Headers::UnexpectedEof))?;
            let line = line.trim_ascii();
            if line.is_empty() {
                break;
            }
            if let Some(i) = line.iter().position(|byte| *byte == b':') {
                let (key, value) = line.split_at(i);
                headers.append(
                    HeaderName::from_bytes(key.trim_ascii())
                        .map_err(Headers::InvalidName)
                        .map_err(error)?,
                    HeaderValue::from_bytes(value[1..].trim_ascii())
                        .map_err(Headers::InvalidValue)
                        .map_err(error)?,
                );
            }
        }
        Ok(headers)
    }
}
