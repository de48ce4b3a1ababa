//! Drives a single connection over an in-memory duplex stream.

use std::sync::Arc;
use std::time::Duration;

use minihttp::http::connection::{dispatch, Connection, Timeouts};
use minihttp::http::request::RequestBuilder;
use minihttp::http::router::Router;
use minihttp::http::status::StatusCode;
use tokio::io::{duplex, AsyncReadExt, AsyncWriteExt};

fn test_router() -> Arc<Router> {
    let mut router = Router::new();
    router
        .register("GET", "/v1/echo/:str", |w, r| {
            let _ = w.write(StatusCode::OK, r.param("str").unwrap_or_default().as_bytes());
        })
        .unwrap();
    router
        .register("GET", "/big", |w, _| {
            let _ = w.write(StatusCode::OK, &[b'x'; 1024]);
        })
        .unwrap();
    router
        .register("GET", "/boom", |_, _| panic!("handler exploded"))
        .unwrap();
    router
        .register("GET", "/late-boom", |w, _| {
            let _ = w.write(StatusCode::OK, b"partial");
            panic!("too late");
        })
        .unwrap();
    Arc::new(router)
}

async fn exchange(router: Arc<Router>, request: &[u8]) -> (anyhow::Result<()>, String) {
    let (mut client, server) = duplex(8192);
    let conn = Connection::new(server, router, Timeouts::default());
    let task = tokio::spawn(conn.run());

    client.write_all(request).await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    (task.await.unwrap(), String::from_utf8_lossy(&out).to_string())
}

#[tokio::test]
async fn test_routes_and_closes() {
    let (res, out) = exchange(test_router(), b"GET /v1/echo/foo HTTP/1.1\r\nHost: x\r\n\r\n").await;

    assert!(res.is_ok());
    assert_eq!(
        out,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 3\r\n\r\nfoo"
    );
}

#[tokio::test]
async fn test_malformed_request_gets_400() {
    let (res, out) = exchange(test_router(), b"NONSENSE\r\n\r\n").await;

    assert!(res.is_ok());
    assert!(out.starts_with("HTTP/1.1 400 Bad Request\r\n"));
    assert!(out.contains("Connection: close\r\n"));
    assert!(out.ends_with("Bad Request"));
}

#[tokio::test]
async fn test_panic_before_header_gets_500() {
    let (res, out) = exchange(test_router(), b"GET /boom HTTP/1.1\r\n\r\n").await;

    assert!(res.is_ok());
    assert!(out.starts_with("HTTP/1.1 500 Internal Server Error\r\n"));
    assert!(out.ends_with("\r\n\r\nInternal Server Error"));
}

#[tokio::test]
async fn test_panic_after_header_keeps_partial_response() {
    let (res, out) = exchange(test_router(), b"GET /late-boom HTTP/1.1\r\n\r\n").await;

    assert!(res.is_ok());
    assert!(out.starts_with("HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with("\r\n\r\npartial"));
    assert!(!out.contains("500"));
}

#[tokio::test]
async fn test_unmatched_route_is_bare_404() {
    let (_, out) = exchange(test_router(), b"GET /nope HTTP/1.1\r\n\r\n").await;

    assert_eq!(out, "HTTP/1.1 404 Not Found\r\n\r\n");
}

#[tokio::test]
async fn test_peer_closing_early_gets_no_response() {
    let (mut client, server) = duplex(1024);
    let conn = Connection::new(server, test_router(), Timeouts::default());
    let task = tokio::spawn(conn.run());

    client.shutdown().await.unwrap();
    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();

    assert!(task.await.unwrap().is_ok());
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_read_deadline_closes_without_response() {
    let (mut client, server) = duplex(1024);
    let timeouts = Timeouts {
        read: Duration::from_millis(50),
        write: Duration::from_secs(1),
    };
    let conn = Connection::new(server, test_router(), timeouts);

    let err = conn.run().await.unwrap_err();
    assert!(err.to_string().contains("read deadline exceeded"));

    let mut out = Vec::new();
    client.read_to_end(&mut out).await.unwrap();
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_write_deadline_when_peer_stops_reading() {
    let (mut client, server) = duplex(64);
    let timeouts = Timeouts {
        read: Duration::from_secs(1),
        write: Duration::from_millis(50),
    };
    let conn = Connection::new(server, test_router(), timeouts);

    client.write_all(b"GET /big HTTP/1.1\r\n\r\n").await.unwrap();
    let err = conn.run().await.unwrap_err();

    assert!(err.to_string().contains("write deadline exceeded"));
    drop(client);
}

#[test]
fn test_dispatch_recovers_from_panic() {
    let router = test_router();
    let req = RequestBuilder::new().method("GET").path("/boom").build().unwrap();

    let w = dispatch(&router, req);

    assert_eq!(w.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(w.header_written());
}
