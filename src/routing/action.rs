//! Route declarations and the action binder.
//!
//! # Responsibilities
//! - Describe routes as plain data (method, path, action)
//! - Bind each action to one resolved dependency set
//! - Provide the single optional downstream continuation (`Next`)
//!
//! # Design Decisions
//! - Actions receive their dependencies as an explicit `Arc<D>` argument
//! - Binding is pure: no validation, no registration, order preserved
//! - Shared mutable state lives behind interior mutability inside `D`

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;

use crate::error::ActionError;
use crate::routing::context::RequestContext;
use crate::routing::method::HttpMethod;

/// Outcome of an action: `Some(value)` responds with that value,
/// `None` leaves the response to the context or the continuation.
pub type ActionResult = Result<Option<Value>, ActionError>;

type UnboundFn<D> =
    dyn Fn(Arc<D>, RequestContext, Next) -> BoxFuture<'static, ActionResult> + Send + Sync;

type BoundFn = dyn Fn(RequestContext, Next) -> BoxFuture<'static, ActionResult> + Send + Sync;

/// Serialize a value as the action's response.
pub fn respond<T: Serialize>(value: &T) -> ActionResult {
    Ok(Some(serde_json::to_value(value)?))
}

/// A route handler not yet bound to a dependency set.
pub struct RouteAction<D> {
    inner: Arc<UnboundFn<D>>,
}

impl<D: Send + Sync + 'static> RouteAction<D> {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |deps, ctx, next| f(deps, ctx, next).boxed()),
        }
    }
}

impl<D> Clone for RouteAction<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

/// A route declared as data. Immutable once constructed.
pub struct RouteDeclaration<D> {
    pub path: String,
    pub method: HttpMethod,
    pub action: RouteAction<D>,
}

impl<D: Send + Sync + 'static> RouteDeclaration<D> {
    pub fn new<F, Fut>(method: HttpMethod, path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::with_action(method, path, RouteAction::new(action))
    }

    /// Declare a route reusing an existing action.
    pub fn with_action(
        method: HttpMethod,
        path: impl Into<String>,
        action: RouteAction<D>,
    ) -> Self {
        Self {
            path: path.into(),
            method,
            action,
        }
    }

    pub fn get<F, Fut>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::new(HttpMethod::Get, path, action)
    }

    pub fn post<F, Fut>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::new(HttpMethod::Post, path, action)
    }

    pub fn put<F, Fut>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::new(HttpMethod::Put, path, action)
    }

    pub fn patch<F, Fut>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::new(HttpMethod::Patch, path, action)
    }

    pub fn delete<F, Fut>(path: impl Into<String>, action: F) -> Self
    where
        F: Fn(Arc<D>, RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::new(HttpMethod::Delete, path, action)
    }
}

impl<D> fmt::Debug for RouteDeclaration<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDeclaration")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// An action closed over its dependency set, ready to register.
#[derive(Clone)]
pub struct BoundAction {
    inner: Arc<BoundFn>,
}

impl BoundAction {
    /// Wrap a closure that already carries whatever state it needs.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(RequestContext, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self {
            inner: Arc::new(move |ctx, next| f(ctx, next).boxed()),
        }
    }

    pub fn call(&self, ctx: RequestContext, next: Next) -> BoxFuture<'static, ActionResult> {
        (self.inner)(ctx, next)
    }
}

impl fmt::Debug for BoundAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoundAction")
    }
}

/// A declaration whose action has been bound; method and path unchanged.
#[derive(Debug, Clone)]
pub struct BoundRoute {
    pub path: String,
    pub method: HttpMethod,
    pub action: BoundAction,
}

/// Bind every declaration to `dependencies`.
///
/// All returned actions share the same `Arc<D>`, so interior mutations made
/// by one action are observed by the others. Nothing is validated here; a
/// missing dependency only surfaces when an action runs.
pub fn bind_route_actions<D>(
    dependencies: impl Into<Arc<D>>,
    declarations: Vec<RouteDeclaration<D>>,
) -> Vec<BoundRoute>
where
    D: Send + Sync + 'static,
{
    let dependencies = dependencies.into();
    declarations
        .into_iter()
        .map(|decl| {
            let deps = dependencies.clone();
            let unbound = decl.action.inner;
            BoundRoute {
                path: decl.path,
                method: decl.method,
                action: BoundAction {
                    inner: Arc::new(move |ctx, next| unbound(deps.clone(), ctx, next)),
                },
            }
        })
        .collect()
}

/// The optional downstream continuation handed to every action.
#[derive(Debug, Default)]
pub struct Next {
    downstream: Option<BoundAction>,
}

impl Next {
    /// A continuation with nothing downstream.
    pub fn end() -> Self {
        Self { downstream: None }
    }

    pub fn new(downstream: BoundAction) -> Self {
        Self {
            downstream: Some(downstream),
        }
    }

    pub fn is_end(&self) -> bool {
        self.downstream.is_none()
    }

    /// Invoke the downstream action, or resolve to no value at the end.
    pub async fn run(self, ctx: RequestContext) -> ActionResult {
        match self.downstream {
            Some(action) => action.call(ctx, Next::end()).await,
            None => Ok(None),
        }
    }
}
