//! Error definitions shared across the crate.
//!
//! Composition errors are fatal at startup; action errors surface only when
//! a handler runs and are turned into HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Boxed error used for failures raised by application-supplied code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that abort a composition run.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A factory failed to produce its dependency set.
    #[error("failed to resolve dependencies for factory at `{prefix}`: {source}")]
    Dependencies { prefix: String, source: BoxError },

    /// A factory failed to create its bound routes.
    #[error("failed to create routes for factory at `{prefix}`: {source}")]
    Create { prefix: String, source: BoxError },

    /// Nesting went deeper than allowed, most likely a cycle.
    #[error("factory nesting exceeds maximum depth {max_depth} at `{prefix}`")]
    DepthExceeded { max_depth: usize, prefix: String },
}

/// Errors raised while handing resolved routes to a registrar.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// The full path is not acceptable to the router.
    #[error("invalid route path `{0}`: paths must start with `/`")]
    InvalidPath(String),

    /// The path overlaps a previously registered one.
    #[error("route `{path}` conflicts with `{existing}`")]
    Conflict { path: String, existing: String },

    /// The path is not a valid route pattern.
    #[error("invalid route pattern `{path}`: {reason}")]
    InvalidPattern { path: String, reason: String },
}

/// Errors that prevent the service from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("composition failed: {0}")]
    Compose(#[from] ComposeError),

    #[error("route registration failed: {0}")]
    Registration(#[from] RegistrationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by a bound action while serving a request.
#[derive(Debug, Error)]
pub enum ActionError {
    /// The action needed a dependency that was not provided.
    #[error("missing dependency `{0}`")]
    MissingDependency(&'static str),

    /// The request could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The action's return value could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other handler failure.
    #[error("handler failed: {0}")]
    Handler(BoxError),
}

impl ActionError {
    /// Wrap an arbitrary error as a handler failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        ActionError::Handler(err.into())
    }

    /// HTTP status used when this error reaches the client.
    pub fn status(&self) -> StatusCode {
        match self {
            ActionError::BadRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
