//! Route composition subsystem.
//!
//! # Data Flow
//! ```text
//! Route declarations (method, path, action)
//!     → action.rs (bind actions to a factory's dependency set)
//!     → factory.rs (resolve dependencies, create bound routes, nest)
//!     → composer.rs (walk the forest, accumulate prefixes, flatten)
//!     → registrar.rs (attach (method, full path, action) to axum)
//! ```
//!
//! # Design Decisions
//! - Routes are composed once at startup, immutable afterwards
//! - Each factory owns its dependency set; children never inherit it
//! - Deterministic: output order follows declaration order

pub mod action;
pub mod composer;
pub mod context;
pub mod factory;
pub mod method;
pub mod registrar;

pub use action::{
    bind_route_actions, respond, ActionResult, BoundAction, BoundRoute, Next, RouteAction,
    RouteDeclaration,
};
pub use composer::{compose, ComposeOptions, Composer, ResolvedRoute};
pub use context::{RequestContext, RequestData};
pub use factory::{shared, DynRouteFactory, FnFactory, RouteFactory, SharedFactory};
pub use method::HttpMethod;
pub use registrar::{create_router, register_routes, AxumRegistrar, Registrar};
