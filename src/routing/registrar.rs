//! Registration of resolved routes with the HTTP router.
//!
//! # Responsibilities
//! - Define the narrow `Registrar` seam (method, full path, action)
//! - Attach routes to an axum `Router` in composition order
//! - Translate requests into `RequestContext` and outcomes into responses
//!
//! # Design Decisions
//! - Duplicate (method, path) pairs: first registered wins, later ones are logged
//! - Paths are handed to axum verbatim and must use its pattern syntax (`/{id}`)
//! - Every new path is checked against the matcher axum uses, so overlapping or
//!   malformed patterns are errors here instead of panics in `Router::route`
//! - Action failures become JSON error responses, never panics

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Instant;

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, FromRequest, FromRequestParts, RawPathParams};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use axum::Router;
use matchit::InsertError;

use crate::config::ServiceConfig;
use crate::error::{RegistrationError, StartupError};
use crate::observability::metrics;
use crate::routing::action::{BoundAction, Next};
use crate::routing::composer::{Composer, ComposeOptions, ResolvedRoute};
use crate::routing::context::{RequestContext, RequestData};
use crate::routing::factory::SharedFactory;
use crate::routing::method::HttpMethod;

/// Sink for resolved routes.
pub trait Registrar {
    fn register(
        &mut self,
        method: HttpMethod,
        full_path: &str,
        action: BoundAction,
    ) -> Result<(), RegistrationError>;
}

/// Register every route in order, stopping at the first rejection.
pub fn register_routes<R>(
    registrar: &mut R,
    routes: Vec<ResolvedRoute>,
) -> Result<usize, RegistrationError>
where
    R: Registrar + ?Sized,
{
    let count = routes.len();
    for route in routes {
        registrar.register(route.method, &route.full_path, route.action)?;
    }
    Ok(count)
}

/// Registrar backed by an axum `Router`.
pub struct AxumRegistrar {
    paths: Vec<(String, MethodRouter)>,
    index: HashMap<String, usize>,
    seen: HashSet<(HttpMethod, String)>,
    matcher: matchit::Router<()>,
    max_body_bytes: usize,
}

impl AxumRegistrar {
    pub fn new(max_body_bytes: usize) -> Self {
        Self {
            paths: Vec::new(),
            index: HashMap::new(),
            seen: HashSet::new(),
            matcher: matchit::Router::new(),
            max_body_bytes,
        }
    }

    /// Number of distinct (method, path) pairs registered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn into_router(self) -> Router {
        let limit = self.max_body_bytes;
        self.paths
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router)
            })
            .layer(DefaultBodyLimit::max(limit))
    }

    /// Admit a path axum has not seen yet, or explain why it would refuse it.
    fn check_pattern(&mut self, full_path: &str) -> Result<(), RegistrationError> {
        // axum 0.8 rejects the 0.7 capture syntax outright
        if let Some(segment) = full_path
            .split('/')
            .find(|segment| segment.starts_with(':') || segment.starts_with('*'))
        {
            return Err(RegistrationError::InvalidPattern {
                path: full_path.to_string(),
                reason: format!("segment `{segment}` uses `:`/`*` syntax, use `{{capture}}`"),
            });
        }

        self.matcher
            .insert(full_path, ())
            .map_err(|err| match err {
                InsertError::Conflict { with } => RegistrationError::Conflict {
                    path: full_path.to_string(),
                    existing: with,
                },
                other => RegistrationError::InvalidPattern {
                    path: full_path.to_string(),
                    reason: other.to_string(),
                },
            })
    }
}

impl fmt::Debug for AxumRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxumRegistrar")
            .field("paths", &self.index.len())
            .field("routes", &self.seen.len())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

impl Default for AxumRegistrar {
    fn default() -> Self {
        Self::new(crate::config::schema::DEFAULT_MAX_BODY_BYTES)
    }
}

impl Registrar for AxumRegistrar {
    fn register(
        &mut self,
        method: HttpMethod,
        full_path: &str,
        action: BoundAction,
    ) -> Result<(), RegistrationError> {
        if !full_path.starts_with('/') {
            return Err(RegistrationError::InvalidPath(full_path.to_string()));
        }

        if !self.index.contains_key(full_path) {
            self.check_pattern(full_path)?;
        }

        if !self.seen.insert((method, full_path.to_string())) {
            tracing::warn!(
                method = %method,
                path = %full_path,
                "Duplicate route ignored, first registration wins"
            );
            return Ok(());
        }

        let pattern = full_path.to_string();
        let handler = move |request: Request<Body>| {
            let action = action.clone();
            let pattern = pattern.clone();
            async move { dispatch(action, pattern, request).await }
        };

        let slot = match self.index.get(full_path) {
            Some(&slot) => slot,
            None => {
                self.paths.push((full_path.to_string(), MethodRouter::new()));
                self.index.insert(full_path.to_string(), self.paths.len() - 1);
                self.paths.len() - 1
            }
        };
        let entry = &mut self.paths[slot].1;
        let current = std::mem::replace(entry, MethodRouter::new());
        *entry = current.on(method.filter(), handler);

        tracing::debug!(method = %method, path = %full_path, "Route registered");
        Ok(())
    }
}

/// Run one bound action for an incoming request.
async fn dispatch(action: BoundAction, pattern: String, request: Request<Body>) -> Response {
    let start = Instant::now();
    let (mut parts, body) = request.into_parts();
    let method = parts.method.to_string();

    let params = match RawPathParams::from_request_parts(&mut parts, &()).await {
        Ok(raw) => raw
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect(),
        Err(rejection) => {
            tracing::debug!(path = %pattern, error = %rejection, "Rejected path parameters");
            let response = rejection.into_response();
            metrics::record_request(&method, &pattern, response.status().as_u16(), start);
            return response;
        }
    };

    let (uri, headers) = (parts.uri.clone(), parts.headers.clone());
    let request_method = parts.method.clone();

    // Limit comes from the `DefaultBodyLimit` layer; overflow is a 413.
    let body = match Bytes::from_request(Request::from_parts(parts, body), &()).await {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(path = %pattern, error = %rejection, "Failed to read request body");
            let response = rejection.into_response();
            metrics::record_request(&method, &pattern, response.status().as_u16(), start);
            return response;
        }
    };

    let ctx = RequestContext::new(RequestData {
        method: request_method,
        uri,
        headers,
        params,
        body,
    });

    let response = match action.call(ctx.clone(), Next::end()).await {
        Ok(value) => ctx.into_response(value),
        Err(err) => {
            tracing::error!(method = %method, path = %pattern, error = %err, "Action failed");
            err.into_response()
        }
    };

    metrics::record_request(&method, &pattern, response.status().as_u16(), start);
    response
}

/// Compose `factories` and register the result on a fresh axum router.
pub async fn create_router(
    factories: &[SharedFactory],
    config: &ServiceConfig,
) -> Result<Router, StartupError> {
    let composer = Composer::new(ComposeOptions::from(&config.composer));
    let routes = composer.compose(factories).await?;

    let mut registrar = AxumRegistrar::new(config.limits.max_body_bytes);
    let count = register_routes(&mut registrar, routes)?;
    metrics::record_composed(registrar.len());

    tracing::info!(
        resolved = count,
        registered = registrar.len(),
        "Routes registered"
    );
    Ok(registrar.into_router())
}
