use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;

use crate::http::parser::{parse_request, ParseError, MAX_REQUEST_SIZE};
use crate::http::request::Request;
use crate::http::router::Router;
use crate::http::status::StatusCode;
use crate::http::writer::ResponseWriter;

/// Read and write deadlines applied to every connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub read: Duration,
    pub write: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            read: Duration::from_secs(10),
            write: Duration::from_secs(10),
        }
    }
}

pub enum ConnectionState {
    Accepted,
    HeadersRead(Request),
    Dispatched(ResponseWriter),
    Flushed,
    Closed,
}

/// Serves exactly one request on a stream, then closes it.
pub struct Connection<S> {
    stream: S,
    router: Arc<Router>,
    timeouts: Timeouts,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, router: Arc<Router>, timeouts: Timeouts) -> Self {
        Self {
            stream,
            router,
            timeouts,
            state: ConnectionState::Accepted,
        }
    }

    /// Drives the connection to `Closed`.
    ///
    /// Returns an error only for connection-level failures: a read or write
    /// error, or a deadline expiring. Bad requests and handler panics are
    /// answered on the wire instead.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Accepted => {
                    self.state = match self.read_request().await? {
                        Some(Ok(req)) => ConnectionState::HeadersRead(req),
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Rejecting malformed request");
                            ConnectionState::Dispatched(bad_request())
                        }
                        // Peer went away without sending anything
                        None => ConnectionState::Closed,
                    };
                }

                ConnectionState::HeadersRead(req) => {
                    log_request(&req);
                    let writer = dispatch(&self.router, req);
                    self.state = ConnectionState::Dispatched(writer);
                }

                ConnectionState::Dispatched(mut writer) => {
                    timeout(self.timeouts.write, writer.flush(&mut self.stream))
                        .await
                        .context("write deadline exceeded")??;
                    self.state = ConnectionState::Flushed;
                }

                ConnectionState::Flushed => {
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(error = %e, "shutdown after flush failed");
                    }
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => break,
            }
        }

        Ok(())
    }

    /// Performs the single bounded read and parses it.
    ///
    /// `Ok(None)` means the peer closed before sending any bytes.
    async fn read_request(&mut self) -> anyhow::Result<Option<Result<Request, ParseError>>> {
        let mut buffer = BytesMut::with_capacity(MAX_REQUEST_SIZE);

        let n = timeout(self.timeouts.read, self.stream.read_buf(&mut buffer))
            .await
            .context("read deadline exceeded")?
            .context("failed to read request")?;

        if n == 0 {
            return Ok(None);
        }

        Ok(Some(parse_request(&buffer)))
    }
}

/// Runs the router for one request inside a panic boundary.
///
/// A handler that panics before emitting its header block is answered with
/// `500 Internal Server Error`. If the header block is already out, the
/// partial response is kept as-is and the panic is only logged.
pub fn dispatch(router: &Router, mut request: Request) -> ResponseWriter {
    let mut writer = ResponseWriter::new();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        router.dispatch(&mut writer, &mut request);
    }));

    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());

        if writer.header_written() {
            tracing::error!(
                method = %request.method,
                path = %request.path,
                panic = %message,
                "Handler panicked after header block was sent"
            );
        } else {
            tracing::error!(
                method = %request.method,
                path = %request.path,
                panic = %message,
                "Handler panicked, responding with 500"
            );
            writer.reset();
            // Freshly reset, so the write cannot hit a closed writer
            let _ = writer.write(StatusCode::INTERNAL_SERVER_ERROR, b"Internal Server Error");
        }
    }

    writer
}

fn bad_request() -> ResponseWriter {
    let mut writer = ResponseWriter::new();
    writer.header().set("Connection", "close");
    let _ = writer.write(StatusCode::BAD_REQUEST, b"Bad Request");
    writer
}

fn log_request(req: &Request) {
    tracing::info!(
        method = %req.method,
        path = %req.path,
        version = %req.version,
        host = req.header("Host").unwrap_or("N/A"),
        user_agent = req.header("User-Agent").unwrap_or("N/A"),
        content_type = req.header("Content-Type").unwrap_or("N/A"),
        "Request"
    );
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
