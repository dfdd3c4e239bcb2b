use std::path::Path;

use async_trait::async_trait;
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, BufReader},
};

use super::error::{error, Line};

/// Longest request or header line accepted from a client, terminator included.
pub const MAX_LINE_SIZE: usize = 8 * 1024;

#[async_trait]
pub trait ReadLine {
    /// Reads up to and including the next `\n`, failing once `limit` bytes pass without one.
    /// Returns `None` at end of stream.
    async fn read_line_capped(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>>;
}

#[async_trait]
impl<R> ReadLine for R
where
    R: AsyncBufRead + ?Sized + Unpin + Send,
{
    async fn read_line_capped(&mut self, limit: usize) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        let read = (&mut *self)
            .take(limit as u64)
            .read_until(b'\n', &mut line)
            .await?;
        if read == 0 {
            return Ok(None);
        }
        if !line.ends_with(b"\n") && line.len() >= limit {
            return Err(error(Line::TooLong(limit)));
        }
        Ok(Some(line))
    }
}

#[async_trait]
pub trait WriteFile {
    /// Streams the file at `path` into the writer, returning the copied length.
    async fn write_file(&mut self, path: &Path) -> io::Result<u64>;
}

#[async_trait]
impl<W> WriteFile for W
where
    W: AsyncWrite + ?Sized + Unpin + Send,
{
    async fn write_file(&mut self, path: &Path) -> io::Result<u64> {
        let file = File::open(path).await?;
        let mut reader = BufReader::new(file);
        let copied = io::copy(&mut reader, self).await;
        if let Err(err) = &copied {
            essentials::warn!("Failed to copy file {:?}: {:?}", path, err);
        }
        copied
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[tokio::test]
    async fn reads_one_line_at_a_time() {
        let mut input: &[u8] = b"first\r\nsecond";
        assert_eq!(
            input.read_line_capped(64).await.unwrap(),
            Some(b"first\r\n".to_vec())
        );
        assert_eq!(
            input.read_line_capped(64).await.unwrap(),
            Some(b"second".to_vec())
        );
        assert_eq!(input.read_line_capped(64).await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejects_lines_over_the_limit() {
        let mut input: &[u8] = b"0123456789\n";
        let err = input.read_line_capped(8).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[tokio::test]
    async fn accepts_a_line_exactly_at_the_limit() {
        let mut input: &[u8] = b"0123456\n";
        assert_eq!(
            input.read_line_capped(8).await.unwrap(),
            Some(b"0123456\n".to_vec())
        );
    }
}
