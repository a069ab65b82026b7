//! Startup orchestration.
//!
//! # Responsibilities
//! - Compose the factory forest and register every route
//! - Wrap the routes in the HTTP server
//! - Bind the listener last, only once routes are in place

use tokio::net::TcpListener;

use crate::config::ServiceConfig;
use crate::error::StartupError;
use crate::http::HttpServer;
use crate::routing::factory::SharedFactory;
use crate::routing::registrar::create_router;

/// A server whose routes are composed and whose listener is bound.
pub struct Started {
    pub server: HttpServer,
    pub listener: TcpListener,
}

/// Compose `factories`, build the server and bind its listener.
///
/// Any composition or registration failure is returned before the
/// listener exists, so a broken forest never serves traffic.
pub async fn startup(
    config: ServiceConfig,
    factories: &[SharedFactory],
) -> Result<Started, StartupError> {
    let routes = create_router(factories, &config).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    Ok(Started {
        server: HttpServer::new(config, routes),
        listener,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BoxError, ComposeError};
    use crate::routing::factory::FnFactory;

    #[tokio::test]
    async fn test_composition_failure_prevents_startup() {
        let broken = FnFactory::new(
            || async { Ok(()) },
            |_deps: ()| async move { Err::<Vec<_>, BoxError>("no routes today".into()) },
        )
        .prefix("/broken")
        .into_shared();

        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();

        match startup(config, &[broken]).await {
            Err(StartupError::Compose(ComposeError::Create { prefix, .. })) => {
                assert_eq!(prefix, "/broken")
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("startup should fail"),
        }
    }

    #[tokio::test]
    async fn test_startup_binds_listener() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".into();

        let started = startup(config, &[]).await.unwrap();
        assert!(started.listener.local_addr().unwrap().port() > 0);
    }
}
