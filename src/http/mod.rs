//! HTTP/1.1 over a raw byte stream.
//!
//! One request per connection, read in a single bounded read, answered,
//! flushed and closed. No keep-alive, chunked encoding or pipelining.
//!
//! # Architecture
//!
//! - **`headers`**: Case-insensitive header multimap
//! - **`status`**: Status codes and reason phrases
//! - **`parser`**: Turns the bytes of one read into a [`request::Request`]
//! - **`router`**: Method + path pattern matching with `:name` captures
//! - **`writer`**: Buffers a response and enforces a single header block
//! - **`connection`**: Per-connection state machine with deadlines and a
//!   panic boundary around handlers
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │  Accepted   │ ← Single read under the read deadline
//!        └──────┬──────┘
//!               │ Parsed (a parse error skips straight to Dispatched with a 400)
//!               ▼
//!        ┌──────────────────┐
//!        │   HeadersRead    │ ← Route and run the handler
//!        └──────┬───────────┘
//!               │ Handler returned (or panicked → 500)
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatched     │ ← Flush under the write deadline
//!        └──────┬───────────┘
//!               ▼
//!        ┌──────────────────┐
//!        │     Flushed      │ ← Shut down the write half
//!        └──────┬───────────┘
//!               ▼
//!            Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use minihttp::http::connection::{Connection, Timeouts};
//! use minihttp::http::router::Router;
//! use minihttp::http::status::StatusCode;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut router = Router::new();
//!     router.register("GET", "/hello/:name", |w, r| {
//!         let _ = w.write(StatusCode::OK, r.param("name").unwrap_or_default().as_bytes());
//!     })?;
//!     let router = Arc::new(router);
//!
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, router.clone(), Timeouts::default());
//!         tokio::spawn(async move {
//!             if let Err(e) = conn.run().await {
//!                 eprintln!("Connection error: {}", e);
//!             }
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod headers;
pub mod parser;
pub mod request;
pub mod router;
pub mod status;
pub mod writer;
