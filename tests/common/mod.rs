//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use route_factory::config::ServiceConfig;
use route_factory::lifecycle::{startup, Shutdown};
use route_factory::{bind_route_actions, respond, FnFactory, RouteDeclaration, SharedFactory};
use tower::ServiceExt;

/// A factory with no dependencies whose GET routes answer `{"name": <name>}`.
#[allow(dead_code)]
pub fn named_factory(prefix: &str, routes: &[(&'static str, &'static str)]) -> FnFactory<()> {
    let routes = routes.to_vec();
    FnFactory::new(
        || async { Ok(()) },
        move |deps: ()| {
            let routes = routes.clone();
            async move {
                let decls = routes
                    .into_iter()
                    .map(|(path, name)| {
                        RouteDeclaration::get(path, move |_deps: Arc<()>, _ctx, _next| async move {
                            respond(&serde_json::json!({ "name": name }))
                        })
                    })
                    .collect();
                Ok(bind_route_actions(deps, decls))
            }
        },
    )
    .prefix(prefix)
}

/// Send a request through a router without a socket.
#[allow(dead_code)]
pub async fn send(
    router: &Router,
    method: &str,
    uri: &str,
) -> (StatusCode, Option<serde_json::Value>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&bytes).unwrap())
    };
    (status, body)
}

/// Start a real server for `factories` on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_server(factories: Vec<SharedFactory>) -> (SocketAddr, Shutdown) {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();

    let started = startup(config, &factories).await.unwrap();
    let addr = started.listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = started.server.run(started.listener, rx).await;
    });

    (addr, shutdown)
}
