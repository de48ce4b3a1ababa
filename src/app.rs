//! Application routes served by the binary.

use crate::config::Config;
use crate::http::request::Request;
use crate::http::router::{RouteError, Router};
use crate::http::status::StatusCode;
use crate::http::writer::ResponseWriter;

/// Builds the route table. Echo and user-agent are also served without the
/// `/v1` prefix.
pub fn router(cfg: &Config) -> Result<Router, RouteError> {
    let mut router = Router::new();

    router.register("GET", "/", root)?;
    router.register("GET", "/v1/healthcheck", healthcheck)?;
    router.register("GET", "/v1/echo/:str", echo)?;
    router.register("GET", "/echo/:str", echo)?;
    router.register("GET", "/v1/user-agent", user_agent)?;
    router.register("GET", "/user-agent", user_agent)?;

    if let Some(body) = cfg.not_found_body.clone() {
        router.set_fallback(move |w, _| reply(w, StatusCode::NOT_FOUND, body.as_bytes()));
    }

    Ok(router)
}

/// Writes a plain response.
///
/// `write` only fails with `WriteError::Closed`, and the connection flushes
/// after the handler returns, so the result is ignored here.
fn reply(w: &mut ResponseWriter, status: StatusCode, body: &[u8]) {
    let _ = w.write(status, body);
}

fn root(w: &mut ResponseWriter, _r: &Request) {
    reply(w, StatusCode::OK, b"OK");
}

fn healthcheck(w: &mut ResponseWriter, _r: &Request) {
    reply(w, StatusCode::OK, b"OK!");
}

fn echo(w: &mut ResponseWriter, r: &Request) {
    reply(w, StatusCode::OK, r.param("str").unwrap_or_default().as_bytes());
}

fn user_agent(w: &mut ResponseWriter, r: &Request) {
    reply(w, StatusCode::OK, r.header("User-Agent").unwrap_or_default().as_bytes());
}
