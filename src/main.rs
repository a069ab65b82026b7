//! Demo service built from route factories.
//!
//! ```text
//!   ┌──────────────┐     ┌────────────┐     ┌────────────┐     ┌──────────┐
//!   │  factories   │────▶│  composer  │────▶│ registrar  │────▶│  axum    │
//!   │ (deps, nest) │     │ (prefixes) │     │ (triples)  │     │  server  │
//!   └──────────────┘     └────────────┘     └────────────┘     └──────────┘
//! ```
//!
//! Routes served:
//! - `GET  /db/status`
//! - `POST /db/connect`, `POST /db/disconnect`
//! - `GET  /db/health/ping`
//! - `GET  /greet/{name}`

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use route_factory::config::{load_config, override_bind_address, ServiceConfig};
use route_factory::lifecycle::{startup, Shutdown};
use route_factory::observability::{logging, metrics};
use route_factory::{
    bind_route_actions, respond, shared, ActionError, BoxError, FnFactory, RouteDeclaration,
    RouteFactory, SharedFactory,
};
use route_factory::routing::BoundRoute;

#[derive(Parser)]
#[command(name = "route-factory")]
#[command(about = "Serve a demo forest of route factories", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

struct DbConnection {
    is_connected: AtomicBool,
}

struct DbDependencies {
    db: DbConnection,
}

/// Database routes; the struct form of a factory.
struct DbRouter;

impl RouteFactory for DbRouter {
    type Dependencies = DbDependencies;

    fn prefix(&self) -> &str {
        "/db"
    }

    async fn get_dependencies(&self) -> Result<DbDependencies, BoxError> {
        Ok(DbDependencies {
            db: DbConnection {
                is_connected: AtomicBool::new(true),
            },
        })
    }

    async fn create(&self, deps: DbDependencies) -> Result<Vec<BoundRoute>, BoxError> {
        Ok(bind_route_actions(
            deps,
            vec![
                RouteDeclaration::post("/connect", |deps: Arc<DbDependencies>, _ctx, _next| async move {
                    deps.db.is_connected.store(true, Ordering::SeqCst);
                    respond(&serde_json::json!({ "connected": true }))
                }),
                RouteDeclaration::post("/disconnect", |deps: Arc<DbDependencies>, _ctx, _next| async move {
                    deps.db.is_connected.store(false, Ordering::SeqCst);
                    respond(&serde_json::json!({ "connected": false }))
                }),
                RouteDeclaration::get("/status", |deps: Arc<DbDependencies>, _ctx, _next| async move {
                    respond(&serde_json::json!({
                        "connected": deps.db.is_connected.load(Ordering::SeqCst)
                    }))
                }),
            ],
        ))
    }

    async fn nested(&self) -> Option<Vec<SharedFactory>> {
        Some(vec![health_factory()])
    }
}

fn health_factory() -> SharedFactory {
    FnFactory::new(
        || async { Ok(()) },
        |deps: ()| async move {
            Ok(bind_route_actions(
                deps,
                vec![RouteDeclaration::get("/ping", |_deps: Arc<()>, _ctx, _next| async move {
                    respond(&"pong")
                })],
            ))
        },
    )
    .prefix("/health")
    .into_shared()
}

struct Greeting {
    salutation: String,
}

fn greet_factory() -> SharedFactory {
    FnFactory::new(
        || async {
            Ok(Greeting {
                salutation: "hello".to_string(),
            })
        },
        |deps: Greeting| async move {
            Ok(bind_route_actions(
                deps,
                vec![RouteDeclaration::get("/{name}", |deps: Arc<Greeting>, ctx, _next| async move {
                    let name = ctx
                        .param("name")
                        .ok_or_else(|| ActionError::BadRequest("missing name".into()))?;
                    respond(&serde_json::json!({
                        "message": format!("{}, {}", deps.salutation, name)
                    }))
                })],
            ))
        },
    )
    .prefix("/greet")
    .into_shared()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config = override_bind_address(config, bind)?;
    }

    logging::init_logging(&config.observability.log_filter);
    tracing::info!("route-factory v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_depth = config.composer.max_depth,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let factories = vec![shared(DbRouter), greet_factory()];
    let started = startup(config, &factories).await?;

    let shutdown = Shutdown::new();
    started
        .server
        .run(started.listener, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
