//! Route factories: declarative units that resolve their own dependencies
//! and produce bound routes, optionally nesting child factories.
//!
//! # Design Decisions
//! - `RouteFactory` is the typed contract; any struct can implement it
//! - `FnFactory` is the plain-data form built from closures
//! - `DynRouteFactory` erases the dependency type so a forest can mix factories
//! - `nested` is a lazy producer; building a factory never builds its children

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};

use crate::error::BoxError;
use crate::routing::action::BoundRoute;

/// A type-erased factory as stored in a forest.
pub type SharedFactory = Arc<dyn DynRouteFactory>;

/// The factory contract implemented by application code.
pub trait RouteFactory: Send + Sync + 'static {
    /// The dependency set this factory resolves for itself.
    type Dependencies: Send + 'static;

    /// Path prefix applied to this factory's routes and its children.
    fn prefix(&self) -> &str {
        ""
    }

    /// Produce a fresh dependency set. May suspend.
    fn get_dependencies(
        &self,
    ) -> impl Future<Output = Result<Self::Dependencies, BoxError>> + Send;

    /// Build bound routes from the resolved dependencies, usually through
    /// [`bind_route_actions`](crate::routing::action::bind_route_actions).
    fn create(
        &self,
        dependencies: Self::Dependencies,
    ) -> impl Future<Output = Result<Vec<BoundRoute>, BoxError>> + Send;

    /// Child factories, resolved after this factory's own routes.
    fn nested(&self) -> impl Future<Output = Option<Vec<SharedFactory>>> + Send {
        std::future::ready(None)
    }
}

/// Which step of a factory failed.
#[derive(Debug)]
pub enum FactoryFailure {
    Dependencies(BoxError),
    Create(BoxError),
}

/// Object-safe view of a [`RouteFactory`].
pub trait DynRouteFactory: Send + Sync {
    fn route_prefix(&self) -> &str;

    /// Resolve dependencies, then create the bound routes.
    fn resolve_routes(&self) -> BoxFuture<'_, Result<Vec<BoundRoute>, FactoryFailure>>;

    fn nested_factories(&self) -> BoxFuture<'_, Option<Vec<SharedFactory>>>;
}

impl<F: RouteFactory> DynRouteFactory for F {
    fn route_prefix(&self) -> &str {
        self.prefix()
    }

    fn resolve_routes(&self) -> BoxFuture<'_, Result<Vec<BoundRoute>, FactoryFailure>> {
        async move {
            let dependencies = self
                .get_dependencies()
                .await
                .map_err(FactoryFailure::Dependencies)?;
            self.create(dependencies).await.map_err(FactoryFailure::Create)
        }
        .boxed()
    }

    fn nested_factories(&self) -> BoxFuture<'_, Option<Vec<SharedFactory>>> {
        self.nested().boxed()
    }
}

/// Erase a factory so it can sit in a forest next to other factories.
pub fn shared<F: RouteFactory>(factory: F) -> SharedFactory {
    Arc::new(factory)
}

type DependenciesFn<D> = dyn Fn() -> BoxFuture<'static, Result<D, BoxError>> + Send + Sync;
type CreateFn<D> = dyn Fn(D) -> BoxFuture<'static, Result<Vec<BoundRoute>, BoxError>> + Send + Sync;
type NestedFn = dyn Fn() -> Vec<SharedFactory> + Send + Sync;

/// A factory assembled from closures.
///
/// ```ignore
/// let status = FnFactory::new(
///     || async { Ok(Deps::default()) },
///     |deps| async move { Ok(bind_route_actions(deps, routes())) },
/// )
/// .prefix("/status");
/// ```
pub struct FnFactory<D> {
    prefix: String,
    get_dependencies: Arc<DependenciesFn<D>>,
    create: Arc<CreateFn<D>>,
    nested: Option<Arc<NestedFn>>,
}

impl<D: Send + 'static> FnFactory<D> {
    pub fn new<G, GFut, C, CFut>(get_dependencies: G, create: C) -> Self
    where
        G: Fn() -> GFut + Send + Sync + 'static,
        GFut: Future<Output = Result<D, BoxError>> + Send + 'static,
        C: Fn(D) -> CFut + Send + Sync + 'static,
        CFut: Future<Output = Result<Vec<BoundRoute>, BoxError>> + Send + 'static,
    {
        Self {
            prefix: String::new(),
            get_dependencies: Arc::new(move || get_dependencies().boxed()),
            create: Arc::new(move |deps| create(deps).boxed()),
            nested: None,
        }
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Attach a lazy producer of child factories.
    pub fn nested<N>(mut self, nested: N) -> Self
    where
        N: Fn() -> Vec<SharedFactory> + Send + Sync + 'static,
    {
        self.nested = Some(Arc::new(nested));
        self
    }

    pub fn into_shared(self) -> SharedFactory {
        shared(self)
    }
}

impl<D> Clone for FnFactory<D> {
    fn clone(&self) -> Self {
        Self {
            prefix: self.prefix.clone(),
            get_dependencies: self.get_dependencies.clone(),
            create: self.create.clone(),
            nested: self.nested.clone(),
        }
    }
}

impl<D> fmt::Debug for FnFactory<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("prefix", &self.prefix)
            .field("nested", &self.nested.is_some())
            .finish_non_exhaustive()
    }
}

impl<D: Send + 'static> RouteFactory for FnFactory<D> {
    type Dependencies = D;

    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn get_dependencies(&self) -> impl Future<Output = Result<D, BoxError>> + Send {
        (self.get_dependencies)()
    }

    fn create(
        &self,
        dependencies: D,
    ) -> impl Future<Output = Result<Vec<BoundRoute>, BoxError>> + Send {
        (self.create)(dependencies)
    }

    fn nested(&self) -> impl Future<Output = Option<Vec<SharedFactory>>> + Send {
        std::future::ready(self.nested.as_ref().map(|produce| produce()))
    }
}
