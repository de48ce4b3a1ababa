//! minihttp - HTTP/1.1 on raw TCP sockets
//!
//! Request parsing, routing and response framing without an HTTP library.

pub mod app;
pub mod config;
pub mod http;
pub mod server;
