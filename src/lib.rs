//! Route factories for axum.
//!
//! Handlers are declared as plain data, grouped into factories that each
//! resolve their own dependencies, and nested to build URL prefixes. The
//! composer flattens a factory forest into (method, full path, action)
//! triples that are registered on an axum `Router` at startup.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::ServiceConfig;
pub use error::{ActionError, BoxError, ComposeError, RegistrationError, StartupError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{
    bind_route_actions, compose, create_router, respond, shared, ActionResult, FnFactory,
    HttpMethod, Next, RequestContext, RouteDeclaration, RouteFactory, SharedFactory,
};
