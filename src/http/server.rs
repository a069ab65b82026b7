//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the composed router with middleware (tracing, timeout, request ID)
//! - Bind server to listener
//! - Stop gracefully on the shutdown broadcast or Ctrl+C

use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::lifecycle::signals::shutdown_signal;

/// HTTP server for a composed route forest.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server around the composed routes.
    pub fn new(config: ServiceConfig, routes: Router) -> Self {
        let router = Self::build_router(&config, routes);
        Self { router, config }
    }

    /// Apply the middleware stack to the composed routes.
    fn build_router(config: &ServiceConfig, routes: Router) -> Router {
        routes
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::action::{respond, BoundAction};
    use crate::routing::method::HttpMethod;
    use crate::routing::registrar::{AxumRegistrar, Registrar};
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_response_carries_request_id() {
        let mut registrar = AxumRegistrar::default();
        registrar
            .register(
                HttpMethod::Get,
                "/ping",
                BoundAction::new(|_ctx, _next| async move { respond(&"pong") }),
            )
            .unwrap();
        let server = HttpServer::new(ServiceConfig::default(), registrar.into_router());

        let response = server
            .router()
            .oneshot(Request::builder().uri("/ping").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));

        let response = server
            .router()
            .oneshot(
                Request::builder()
                    .uri("/ping")
                    .header("x-request-id", "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "abc-123");
    }

    #[tokio::test]
    async fn test_slow_action_times_out() {
        let mut registrar = AxumRegistrar::default();
        registrar
            .register(
                HttpMethod::Get,
                "/slow",
                BoundAction::new(|_ctx, _next| async move {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    respond(&"late")
                }),
            )
            .unwrap();
        let mut config = ServiceConfig::default();
        config.timeouts.request_secs = 1;
        let server = HttpServer::new(config, registrar.into_router());

        let response = server
            .router()
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }
}
