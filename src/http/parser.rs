use bytes::Bytes;
use thiserror::Error;

use crate::http::headers::HeaderMap;
use crate::http::request::{Params, Request};

/// Size of the single read a connection performs before parsing.
pub const MAX_REQUEST_SIZE: usize = 4096;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,
    #[error("header block exceeds {MAX_REQUEST_SIZE} bytes")]
    HeadersTooLarge,
    #[error("header block is not valid UTF-8")]
    InvalidUtf8,
}

/// Parses one request out of the bytes returned by a single read.
///
/// The header block ends at the first blank line or at the end of `buf`.
/// Whatever follows the blank line is kept as the body without further
/// interpretation. A buffer that is completely full but has no blank line
/// means the headers did not fit and is rejected.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (head, body) = match find_headers_end(buf) {
        Some(end) => (&buf[..end], &buf[end + 4..]),
        None if buf.len() >= MAX_REQUEST_SIZE => return Err(ParseError::HeadersTooLarge),
        None => (buf, &[][..]),
    };

    let head = std::str::from_utf8(head).map_err(|_| ParseError::InvalidUtf8)?;

    let (request_line, rest) = match head.split_once("\r\n") {
        Some((line, rest)) => (line, rest),
        None => (head, ""),
    };
    let (method, path, version) = parse_request_line(request_line)?;

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers: parse_header_block(rest),
        params: Params::new(),
        body: Bytes::copy_from_slice(body),
    })
}

fn parse_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.splitn(3, ' ');

    let method = parts.next().filter(|s| !s.is_empty());
    let path = parts.next().filter(|s| !s.is_empty());
    let version = parts.next().filter(|s| !s.is_empty());

    match (method, path, version) {
        (Some(m), Some(p), Some(v)) => Ok((m, p, v)),
        _ => Err(ParseError::MalformedRequestLine),
    }
}

/// Parses `Name: value` lines up to the first blank line.
///
/// Lines without a colon, or with nothing before it, are skipped. Values are
/// trimmed, and repeated names accumulate in order.
pub fn parse_header_block(text: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for line in text.split("\r\n") {
        if line.is_empty() {
            break;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }

        headers.add(name, value.trim());
    }

    headers
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
