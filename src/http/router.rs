//! Method + path routing with `:name` captures.
//!
//! Routes are scanned in registration order and the first match wins, so a
//! more specific pattern has to be registered before a more general one that
//! overlaps it. The router does not reorder or detect overlaps.

use std::fmt;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use thiserror::Error;

use crate::http::request::{strip_query, Params, Request};
use crate::http::status::StatusCode;
use crate::http::writer::ResponseWriter;

/// A request handler. Writes its response through the [`ResponseWriter`].
pub type Handler = Arc<dyn Fn(&mut ResponseWriter, &Request) + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("pattern {0:?} must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern {0:?} has a ':' segment without a name")]
    EmptyParamName(String),
    #[error("pattern {pattern:?} binds {name:?} more than once")]
    DuplicateParamName { pattern: String, name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param,
}

/// A compiled route pattern such as `/v1/echo/:str`.
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

impl Pattern {
    pub fn compile(raw: &str) -> Result<Self, RouteError> {
        if !raw.starts_with('/') {
            return Err(RouteError::MissingLeadingSlash(raw.to_string()));
        }

        let mut segments = Vec::new();
        let mut param_names: Vec<String> = Vec::new();

        for part in raw.split('/') {
            match part.strip_prefix(':') {
                Some("") => return Err(RouteError::EmptyParamName(raw.to_string())),
                Some(name) => {
                    if param_names.iter().any(|n| n == name) {
                        return Err(RouteError::DuplicateParamName {
                            pattern: raw.to_string(),
                            name: name.to_string(),
                        });
                    }
                    param_names.push(name.to_string());
                    segments.push(Segment::Param);
                }
                None => segments.push(Segment::Literal(part.to_string())),
            }
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
            param_names,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parameter names in the order they appear in the pattern.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Matches a path (query already stripped) and returns decoded captures.
    pub fn matches(&self, path: &str) -> Option<Params> {
        let mut parts = path.split('/');
        let mut names = self.param_names.iter();
        let mut params = Params::new();

        for segment in &self.segments {
            let part = parts.next()?;
            match segment {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Param => {
                    if part.is_empty() {
                        return None;
                    }
                    let name = names.next()?;
                    params.insert(name.clone(), decode_param(part));
                }
            }
        }

        if parts.next().is_some() {
            return None;
        }

        Some(params)
    }
}

/// Percent-decodes a captured segment.
///
/// The raw text is kept when an escape is malformed (`%` not followed by two
/// hex digits) or the decoded bytes are not valid UTF-8.
fn decode_param(raw: &str) -> String {
    let well_formed = raw.split('%').skip(1).all(|rest| {
        rest.len() >= 2 && rest.as_bytes()[..2].iter().all(u8::is_ascii_hexdigit)
    });
    if !well_formed {
        return raw.to_string();
    }

    match percent_decode_str(raw).decode_utf8() {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

pub struct Route {
    method: String,
    pattern: Pattern,
    handler: Handler,
}

impl Route {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw)
            .finish()
    }
}

/// Route table shared read-only by every connection.
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    fallback: Option<Handler>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `method` requests whose path matches `pattern`.
    pub fn register<F>(&mut self, method: &str, pattern: &str, handler: F) -> Result<(), RouteError>
    where
        F: Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static,
    {
        let pattern = Pattern::compile(pattern)?;
        tracing::debug!(method, pattern = pattern.as_str(), "Registered route");

        self.routes.push(Route {
            method: method.to_string(),
            pattern,
            handler: Arc::new(handler),
        });
        Ok(())
    }

    /// Installs the handler used when no route matches.
    pub fn set_fallback<F>(&mut self, handler: F)
    where
        F: Fn(&mut ResponseWriter, &Request) + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(handler));
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Finds the first route for `method` whose pattern matches `path`.
    ///
    /// Any query string on `path` is ignored.
    pub fn find(&self, method: &str, path: &str) -> Option<(&Handler, Params)> {
        let path = strip_query(path);

        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| route.pattern.matches(path).map(|p| (&route.handler, p)))
    }

    /// Routes `request` and runs the selected handler.
    ///
    /// Without a match the fallback runs, or a bare `404` is left pending on
    /// the writer when no fallback is installed.
    pub fn dispatch(&self, w: &mut ResponseWriter, request: &mut Request) {
        match self.find(&request.method, &request.path) {
            Some((handler, params)) => {
                request.params = params;
                handler(w, &*request);
            }
            None => match &self.fallback {
                Some(fallback) => fallback(w, &*request),
                None => w.write_header(StatusCode::NOT_FOUND),
            },
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}
