//! Router-level tests for composed factory forests.

use axum::http::StatusCode;
use route_factory::config::ServiceConfig;
use route_factory::{create_router, RegistrationError, StartupError};
use serde_json::json;

mod common;

use common::{named_factory, send};

#[tokio::test]
async fn test_nested_routers() {
    let nested = named_factory("", &[("/nested", "nested")]).into_shared();
    let top = named_factory("/all", &[("/top", "top")])
        .nested(move || vec![nested.clone()])
        .into_shared();

    let router = create_router(&[top], &ServiceConfig::default()).await.unwrap();

    assert_eq!(
        send(&router, "GET", "/all/top").await,
        (StatusCode::OK, Some(json!({ "name": "top" })))
    );
    assert_eq!(
        send(&router, "GET", "/all/nested").await,
        (StatusCode::OK, Some(json!({ "name": "nested" })))
    );
    assert_eq!(send(&router, "GET", "/all/invalid").await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&router, "GET", "/top").await.0, StatusCode::NOT_FOUND);
    assert_eq!(send(&router, "GET", "/nested").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_nested_router_with_prefix() {
    let nested = named_factory("/b", &[("/nested", "nested")]).into_shared();
    let top = named_factory("/all", &[("/top", "top")])
        .nested(move || vec![nested.clone()])
        .into_shared();

    let router = create_router(&[top], &ServiceConfig::default()).await.unwrap();

    assert_eq!(send(&router, "GET", "/all/top").await.0, StatusCode::OK);
    assert_eq!(
        send(&router, "GET", "/all/b/nested").await,
        (StatusCode::OK, Some(json!({ "name": "nested" })))
    );
    assert_eq!(send(&router, "GET", "/all/nested").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_double_nested_router() {
    let deep = named_factory("/a", &[("/nested", "nested-a")]).into_shared();
    let nested = named_factory("/b", &[("/nested", "nested-b")])
        .nested(move || vec![deep.clone()])
        .into_shared();
    let top = named_factory("/all", &[("/top", "top")])
        .nested(move || vec![nested.clone()])
        .into_shared();

    let router = create_router(&[top], &ServiceConfig::default()).await.unwrap();

    assert_eq!(send(&router, "GET", "/all/top").await.1, Some(json!({ "name": "top" })));
    assert_eq!(
        send(&router, "GET", "/all/b/a/nested").await.1,
        Some(json!({ "name": "nested-a" }))
    );
    assert_eq!(
        send(&router, "GET", "/all/b/nested").await.1,
        Some(json!({ "name": "nested-b" }))
    );
    assert_eq!(send(&router, "GET", "/all/nested").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_flat_nested_routers() {
    let nested = named_factory("", &[("/nested", "nested")]).into_shared();
    let top = named_factory("", &[("/top", "top")])
        .nested(move || vec![nested.clone()])
        .into_shared();

    let router = create_router(&[top], &ServiceConfig::default()).await.unwrap();

    assert_eq!(send(&router, "GET", "/top").await.1, Some(json!({ "name": "top" })));
    assert_eq!(send(&router, "GET", "/nested").await.1, Some(json!({ "name": "nested" })));
    assert_eq!(send(&router, "GET", "/invalid").await.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    let top = named_factory("/only", &[("/get", "get")]).into_shared();
    let router = create_router(&[top], &ServiceConfig::default()).await.unwrap();

    assert_eq!(send(&router, "POST", "/only/get").await.0, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_depth_limit_from_config() {
    let deep = named_factory("/c", &[("/x", "x")]).into_shared();
    let middle = named_factory("/b", &[]).nested(move || vec![deep.clone()]).into_shared();
    let top = named_factory("/a", &[]).nested(move || vec![middle.clone()]).into_shared();

    let mut config = ServiceConfig::default();
    config.composer.max_depth = 1;
    let err = create_router(&[top.clone()], &config).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "composition failed: factory nesting exceeds maximum depth 1 at `/a/b/c`"
    );

    config.composer.max_depth = 2;
    let router = create_router(&[top], &config).await.unwrap();
    assert_eq!(send(&router, "GET", "/a/b/c/x").await.0, StatusCode::OK);
}

#[tokio::test]
async fn test_zero_depth_allows_top_level_only() {
    let mut config = ServiceConfig::default();
    config.composer.max_depth = 0;

    let flat = named_factory("/flat", &[("/x", "x")]).into_shared();
    let router = create_router(&[flat], &config).await.unwrap();
    assert_eq!(send(&router, "GET", "/flat/x").await.0, StatusCode::OK);

    let child = named_factory("/child", &[("/y", "y")]).into_shared();
    let parent = named_factory("/parent", &[])
        .nested(move || vec![child.clone()])
        .into_shared();
    assert!(matches!(
        create_router(&[parent], &config).await,
        Err(StartupError::Compose(_))
    ));
}

#[tokio::test]
async fn test_overlapping_captures_fail_startup() {
    let by_id = named_factory("/users", &[("/{id}", "by-id")]).into_shared();
    let by_name = named_factory("/users", &[("/{name}", "by-name")]).into_shared();

    let err = create_router(&[by_id, by_name], &ServiceConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StartupError::Registration(RegistrationError::Conflict { ref path, .. })
            if path == "/users/{name}"
    ));
}

#[tokio::test]
async fn test_colon_capture_fails_startup() {
    let legacy = named_factory("", &[("/x", "x"), ("/:id", "id")]).into_shared();

    let err = create_router(&[legacy], &ServiceConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StartupError::Registration(RegistrationError::InvalidPattern { .. })
    ));
}
