//! Factory forest composition.
//!
//! # Data Flow
//! ```text
//! top-level factories (prefix "")
//!     → resolve dependencies, create bound routes   (siblings concurrently)
//!     → emit own routes with accumulated prefix
//!     → recurse into nested factories with prefix + own prefix
//!     → flatten in declaration order
//! ```
//!
//! # Design Decisions
//! - Output order never depends on which sibling resolves first
//! - Prefixes are concatenated verbatim, no slash normalization
//! - Duplicate (method, path) pairs are passed through untouched
//! - Any failure aborts the whole run; there is no partial result
//! - Depth is bounded so a cyclic `nested` fails fast instead of recursing forever

use futures_util::future::{try_join_all, BoxFuture, FutureExt};

use crate::config::ComposerConfig;
use crate::error::ComposeError;
use crate::routing::action::BoundAction;
use crate::routing::factory::{FactoryFailure, SharedFactory};
use crate::routing::method::HttpMethod;

/// Default nesting depth limit.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// A route ready for registration.
#[derive(Debug, Clone)]
pub struct ResolvedRoute {
    pub method: HttpMethod,
    pub full_path: String,
    pub action: BoundAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Deepest nesting level accepted; top-level factories sit at depth 0.
    pub max_depth: usize,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl From<&ComposerConfig> for ComposeOptions {
    fn from(config: &ComposerConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }
}

/// Walks a factory forest and flattens it into resolved routes.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    options: ComposeOptions,
}

impl Composer {
    pub fn new(options: ComposeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ComposeOptions {
        self.options
    }

    /// Compose `factories` in order, starting from an empty prefix.
    pub async fn compose(
        &self,
        factories: &[SharedFactory],
    ) -> Result<Vec<ResolvedRoute>, ComposeError> {
        let routes = self.resolve_level(factories.to_vec(), String::new(), 0).await?;
        tracing::info!(
            factories = factories.len(),
            routes = routes.len(),
            "Route composition complete"
        );
        Ok(routes)
    }

    fn resolve_level(
        &self,
        factories: Vec<SharedFactory>,
        prefix: String,
        depth: usize,
    ) -> BoxFuture<'_, Result<Vec<ResolvedRoute>, ComposeError>> {
        async move {
            let branches = factories
                .into_iter()
                .map(|factory| self.resolve_factory(factory, prefix.clone(), depth));
            let resolved = try_join_all(branches).await?;
            Ok(resolved.into_iter().flatten().collect())
        }
        .boxed()
    }

    async fn resolve_factory(
        &self,
        factory: SharedFactory,
        parent_prefix: String,
        depth: usize,
    ) -> Result<Vec<ResolvedRoute>, ComposeError> {
        let full_prefix = format!("{}{}", parent_prefix, factory.route_prefix());

        if depth > self.options.max_depth {
            tracing::error!(
                prefix = %full_prefix,
                max_depth = self.options.max_depth,
                "Factory nesting too deep"
            );
            return Err(ComposeError::DepthExceeded {
                max_depth: self.options.max_depth,
                prefix: full_prefix,
            });
        }

        let bound = factory.resolve_routes().await.map_err(|failure| match failure {
            FactoryFailure::Dependencies(source) => ComposeError::Dependencies {
                prefix: full_prefix.clone(),
                source,
            },
            FactoryFailure::Create(source) => ComposeError::Create {
                prefix: full_prefix.clone(),
                source,
            },
        })?;

        let mut routes: Vec<ResolvedRoute> = bound
            .into_iter()
            .map(|route| ResolvedRoute {
                method: route.method,
                full_path: format!("{}{}", full_prefix, route.path),
                action: route.action,
            })
            .collect();

        tracing::debug!(
            prefix = %full_prefix,
            depth,
            routes = routes.len(),
            "Factory resolved"
        );

        if let Some(children) = factory.nested_factories().await {
            if !children.is_empty() {
                let nested = self.resolve_level(children, full_prefix, depth + 1).await?;
                routes.extend(nested);
            }
        }

        Ok(routes)
    }
}

/// Compose with default options.
pub async fn compose(factories: &[SharedFactory]) -> Result<Vec<ResolvedRoute>, ComposeError> {
    Composer::default().compose(factories).await
}
