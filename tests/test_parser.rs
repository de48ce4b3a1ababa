use minihttp::http::parser::{parse_header_block, parse_request, ParseError, MAX_REQUEST_SIZE};

#[test]
fn test_parse_simple_get_request() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method, "GET");
    assert_eq!(parsed.path, "/");
    assert_eq!(parsed.version, "HTTP/1.1");
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.params.is_empty());
}

#[test]
fn test_parse_multiple_headers() {
    let req = b"GET /path HTTP/1.1\r\nHost: example.com\r\nUser-Agent: test-client\r\nAccept: */*\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 3);
    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert_eq!(parsed.header("User-Agent"), Some("test-client"));
    assert_eq!(parsed.header("Accept"), Some("*/*"));
}

#[test]
fn test_parse_repeated_headers_accumulate_regardless_of_case() {
    let req = b"GET / HTTP/1.1\r\nfOO: Bar\r\nHost: a\r\nfoo: two\r\nFOO: three\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 2);
    assert_eq!(parsed.headers.get_all("Foo"), ["Bar", "two", "three"]);
    let names: Vec<&str> = parsed.headers.iter().map(|(n, _)| n).collect();
    assert_eq!(names, ["Foo", "Host"]);
}

#[test]
fn test_parse_request_with_path_and_query_string() {
    let req = b"GET /search?q=rust HTTP/1.1\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.path, "/search?q=rust");
    assert_eq!(parsed.path_without_query(), "/search");
    assert_eq!(parsed.query(), Some("q=rust"));
}

#[test]
fn test_parse_method_is_passed_through() {
    let parsed = parse_request(b"BREW /pot HTTP/1.1\r\n\r\n").unwrap();
    assert_eq!(parsed.method, "BREW");
}

#[test]
fn test_parse_request_line_with_too_few_tokens() {
    for line in ["GET /\r\n\r\n", "GET\r\n\r\n", "\r\n\r\n", "", "GET  HTTP/1.1\r\n\r\n"] {
        let result = parse_request(line.as_bytes());
        assert!(
            matches!(result, Err(ParseError::MalformedRequestLine)),
            "expected malformed for {:?}",
            line
        );
    }
}

#[test]
fn test_parse_header_line_without_colon_is_skipped() {
    let req = b"GET / HTTP/1.1\r\nBrokenHeader\r\nHost: example.com\r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.headers.len(), 1);
    assert_eq!(parsed.header("Host"), Some("example.com"));
}

#[test]
fn test_parse_header_value_is_trimmed_and_split_on_first_colon() {
    let req = b"GET / HTTP/1.1\r\nHost:   localhost:4221   \r\n\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.header("host"), Some("localhost:4221"));
}

#[test]
fn test_parse_without_blank_line_ends_at_buffer() {
    let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.header("Host"), Some("example.com"));
    assert!(parsed.body.is_empty());
}

#[test]
fn test_parse_keeps_trailing_bytes_as_body() {
    let req = b"POST /upload HTTP/1.1\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\x03";
    let parsed = parse_request(req).unwrap();

    assert_eq!(parsed.method, "POST");
    assert_eq!(&parsed.body[..], &[0, 1, 2, 3]);
}

#[test]
fn test_parse_full_buffer_without_terminator_is_too_large() {
    let mut req = b"GET / HTTP/1.1\r\nX-Big: ".to_vec();
    req.resize(MAX_REQUEST_SIZE, b'a');

    assert_eq!(parse_request(&req).unwrap_err(), ParseError::HeadersTooLarge);
}

#[test]
fn test_parse_invalid_utf8_in_headers() {
    let req = b"GET / HTTP/1.1\r\nX-Bad: \xff\xfe\r\n\r\n";
    assert_eq!(parse_request(req).unwrap_err(), ParseError::InvalidUtf8);
}

#[test]
fn test_parse_header_block_stops_at_blank_line() {
    let headers = parse_header_block("A: 1\r\n\r\nB: 2\r\n");

    assert_eq!(headers.get("A"), Some("1"));
    assert!(!headers.contains("B"));
}
