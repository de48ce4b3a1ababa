use minihttp::http::request::RequestBuilder;

#[test]
fn test_request_builder_basic() {
    let request = RequestBuilder::new()
        .method("GET")
        .path("/test")
        .build()
        .unwrap();

    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/test");
    assert_eq!(request.version, "HTTP/1.1");
    assert!(request.headers.is_empty());
    assert!(request.body.is_empty());
}

#[test]
fn test_request_builder_missing_method() {
    let result = RequestBuilder::new().path("/test").build();

    assert_eq!(result.unwrap_err(), "method missing");
}

#[test]
fn test_request_builder_missing_path() {
    let result = RequestBuilder::new().method("GET").build();

    assert_eq!(result.unwrap_err(), "path missing");
}

#[test]
fn test_request_header_lookup_case_insensitive() {
    let request = RequestBuilder::new()
        .method("GET")
        .path("/")
        .header("user-agent", "curl/8.0")
        .build()
        .unwrap();

    assert_eq!(request.header("User-Agent"), Some("curl/8.0"));
    assert_eq!(request.header("USER-AGENT"), Some("curl/8.0"));
    assert_eq!(request.header("Host"), None);
}

#[test]
fn test_request_builder_repeated_header() {
    let request = RequestBuilder::new()
        .method("GET")
        .path("/")
        .header("Accept", "text/html")
        .header("accept", "text/plain")
        .build()
        .unwrap();

    assert_eq!(request.headers.get_all("Accept"), ["text/html", "text/plain"]);
}

#[test]
fn test_request_query_split() {
    let request = RequestBuilder::new()
        .method("GET")
        .path("/search?q=rust&page=2")
        .build()
        .unwrap();

    assert_eq!(request.path_without_query(), "/search");
    assert_eq!(request.query(), Some("q=rust&page=2"));
}

#[test]
fn test_request_without_query() {
    let request = RequestBuilder::new().method("GET").path("/plain").build().unwrap();

    assert_eq!(request.path_without_query(), "/plain");
    assert_eq!(request.query(), None);
    assert_eq!(request.param("anything"), None);
}
