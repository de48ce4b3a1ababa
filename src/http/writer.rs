use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::headers::HeaderMap;
use crate::http::status::StatusCode;

const HTTP_VERSION: &str = "HTTP/1.1";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("response already flushed")]
    Closed,
    #[error("failed to write response: {0}")]
    Io(#[from] std::io::Error),
}

/// Lifecycle of a response.
///
/// `Fresh` until the status line and headers are serialized, `HeaderSent`
/// afterwards, `Closed` once the buffer has been flushed to the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Fresh,
    HeaderSent,
    Closed,
}

/// Buffers one HTTP response and writes it out in a single flush.
///
/// The header block reaches the buffer at most once. Handlers run
/// synchronously against this type; the connection pushes the buffered bytes
/// to the socket afterwards with [`flush`](Self::flush).
///
/// While `Fresh`, repeated [`write_header`](Self::write_header) calls
/// overwrite the pending status (last call wins). Once the header block is
/// serialized, status and header changes no longer reach the wire.
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    state: WriterState,
    buffer: BytesMut,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            state: WriterState::Fresh,
            buffer: BytesMut::with_capacity(1024),
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn header_written(&self) -> bool {
        self.state != WriterState::Fresh
    }

    /// The status that was, or will be, put on the status line.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Mutable access to the response headers.
    ///
    /// Edits made after the header block has been serialized are kept in
    /// memory but never sent.
    pub fn header(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Sets the pending status code.
    ///
    /// # Panics
    ///
    /// Panics if `status` is outside `100..=999`. That is a bug in the
    /// calling handler, not a property of the request.
    pub fn write_header(&mut self, status: impl Into<StatusCode>) {
        let status = status.into();
        assert!(
            status.is_valid(),
            "invalid status code {}",
            status.as_u16()
        );

        if self.state != WriterState::Fresh {
            tracing::debug!(
                status = status.as_u16(),
                sent = self.status.as_u16(),
                "ignoring status change after header block was sent"
            );
            return;
        }

        self.status = status;
    }

    /// Writes a complete plain response: status, headers and `body`.
    ///
    /// On the first call this sets the status, defaults `Content-Type` to
    /// `text/plain`, sets `Content-Length` from `body` and serializes the
    /// header block. Later calls only append their body bytes.
    ///
    /// Returns the number of body bytes buffered.
    pub fn write(
        &mut self,
        status: impl Into<StatusCode>,
        body: &[u8],
    ) -> Result<usize, WriteError> {
        if self.state == WriterState::Closed {
            return Err(WriteError::Closed);
        }

        self.write_header(status);

        if self.state == WriterState::Fresh {
            if !self.headers.contains("Content-Type") {
                self.headers.set("Content-Type", "text/plain");
            }
            self.headers.set("Content-Length", body.len().to_string());
            self.write_header_block();
        }

        self.buffer.extend_from_slice(body);
        Ok(body.len())
    }

    /// Pushes everything buffered to `out` and closes the response.
    ///
    /// A response that never wrote anything still gets its status line and
    /// headers, with no body. Calling this a second time fails with
    /// [`WriteError::Closed`].
    pub async fn flush<W>(&mut self, out: &mut W) -> Result<(), WriteError>
    where
        W: AsyncWrite + Unpin,
    {
        if self.state == WriterState::Closed {
            return Err(WriteError::Closed);
        }

        if self.state == WriterState::Fresh {
            self.write_header_block();
        }
        self.state = WriterState::Closed;

        let bytes = self.buffer.split().freeze();
        out.write_all(&bytes).await?;
        out.flush().await?;

        Ok(())
    }

    /// Drops anything buffered and returns to `Fresh` with a clean header map.
    ///
    /// Used by the connection to replace a response whose handler failed
    /// before it emitted a header block.
    pub(crate) fn reset(&mut self) {
        self.status = StatusCode::OK;
        self.headers = HeaderMap::new();
        self.state = WriterState::Fresh;
        self.buffer.clear();
    }

    /// Bytes buffered so far and not yet flushed.
    pub fn buffered(&self) -> &[u8] {
        &self.buffer
    }

    fn write_header_block(&mut self) {
        let status_line = format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.status.as_u16(),
            self.status.reason_phrase()
        );
        self.buffer.extend_from_slice(status_line.as_bytes());

        for (name, values) in self.headers.iter() {
            for value in values {
                self.buffer.extend_from_slice(name.as_bytes());
                self.buffer.extend_from_slice(b": ");
                self.buffer.extend_from_slice(value.as_bytes());
                self.buffer.extend_from_slice(b"\r\n");
            }
        }

        self.buffer.extend_from_slice(b"\r\n");
        self.state = WriterState::HeaderSent;
    }
}
