//! Per-request context handed to bound actions.
//!
//! # Design Decisions
//! - The context is a cheap clonable handle; clones share one response slot
//! - Request data is immutable once the context is built
//! - An action that returns nothing and sets no body yields 404

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ActionError;

/// Incoming request data captured before the action runs.
#[derive(Debug, Clone)]
pub struct RequestData {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Named path parameters from the matched route pattern.
    pub params: HashMap<String, String>,
    pub body: Bytes,
}

impl Default for RequestData {
    fn default() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::from_static("/"),
            headers: HeaderMap::new(),
            params: HashMap::new(),
            body: Bytes::new(),
        }
    }
}

#[derive(Debug, Default)]
struct ResponseState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: Option<Value>,
}

/// Request/response context for one invocation of a bound action.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    request: Arc<RequestData>,
    response: Arc<Mutex<ResponseState>>,
}

impl RequestContext {
    pub fn new(request: RequestData) -> Self {
        Self {
            request: Arc::new(request),
            response: Arc::default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    pub fn path(&self) -> &str {
        self.request.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.request.headers
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.request.params.get(name).map(String::as_str)
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.request.params
    }

    pub fn body(&self) -> &Bytes {
        &self.request.body
    }

    /// Decode the request body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ActionError> {
        serde_json::from_slice(&self.request.body)
            .map_err(|e| ActionError::BadRequest(e.to_string()))
    }

    pub fn set_status(&self, status: StatusCode) {
        self.state().status = Some(status);
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.state().status
    }

    pub fn set_header(&self, name: HeaderName, value: HeaderValue) {
        self.state().headers.insert(name, value);
    }

    /// Set the response body without returning it from the action.
    pub fn set_body(&self, body: Value) {
        self.state().body = Some(body);
    }

    pub fn response_body(&self) -> Option<Value> {
        self.state().body.clone()
    }

    /// Build the HTTP response from the action's return value and the
    /// response slot. A returned value takes precedence over a body set
    /// on the context.
    pub fn into_response(self, returned: Option<Value>) -> Response {
        let mut state = self.state();
        let headers = std::mem::take(&mut state.headers);
        let body = returned.or_else(|| state.body.take());

        let mut response = match body {
            Some(value) => {
                let status = state.status.unwrap_or(StatusCode::OK);
                (status, Json(value)).into_response()
            }
            None => {
                let status = state.status.unwrap_or(StatusCode::NOT_FOUND);
                (status, Body::empty()).into_response()
            }
        };
        response.headers_mut().extend(headers);
        response
    }

    fn state(&self) -> MutexGuard<'_, ResponseState> {
        self.response.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_response_slot() {
        let ctx = RequestContext::default();
        let other = ctx.clone();
        other.set_status(StatusCode::CREATED);
        other.set_body(serde_json::json!({ "ok": true }));

        assert_eq!(ctx.status(), Some(StatusCode::CREATED));
        assert_eq!(ctx.response_body(), Some(serde_json::json!({ "ok": true })));
    }

    #[test]
    fn test_empty_response_is_not_found() {
        let response = RequestContext::default().into_response(None);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_returned_value_defaults_to_ok() {
        let ctx = RequestContext::default();
        ctx.set_header(
            HeaderName::from_static("x-test"),
            HeaderValue::from_static("1"),
        );
        let response = ctx.into_response(Some(serde_json::json!({ "a": 1 })));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-test"], "1");
    }

    #[test]
    fn test_json_body_rejects_garbage() {
        let ctx = RequestContext::new(RequestData {
            body: Bytes::from_static(b"not json"),
            ..Default::default()
        });
        let result: Result<Value, _> = ctx.json();
        assert!(matches!(result, Err(ActionError::BadRequest(_))));
    }
}
