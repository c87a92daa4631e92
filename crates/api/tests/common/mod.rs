#![allow(dead_code)]

use std::sync::Arc;

use axum::{
  body::{to_bytes, Body},
  http::{header::CONTENT_TYPE, Method, Request, StatusCode},
  Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use tempus_api::config::ServerConfig;

pub const ACME_PROJECT_ID: &str = "5b0c1d5e-3f7a-4c1e-9a52-0d7f6a3b8c11";
pub const GLOBEX_PROJECT_ID: &str = "9e4f2a7b-6c3d-4b8e-8f1a-2c5d7e9b0a22";

/// Build the full application router over the given pool.
pub fn build_test_app(pool: SqlitePool) -> Router {
  tempus_api::router(Arc::new(pool), &ServerConfig::default()).unwrap()
}

/// Send a request and return the status with the decoded JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let request = Request::builder().method(method).uri(uri);

  let request = match body {
    Some(body) => request
      .header(CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => request.body(Body::empty()).unwrap(),
  };

  let response = app.oneshot(request).await.unwrap();
  let status = response.status();
  let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };

  (status, json)
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
  send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
  send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
  send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> (StatusCode, Value) {
  send(app, Method::DELETE, uri, None).await
}

pub fn entry_payload(from: &str, to: &str) -> Value {
  serde_json::json!({
    "from": from,
    "to": to,
    "projectId": ACME_PROJECT_ID,
    "breakDurationMinutes": 0,
    "description": "Implementation",
  })
}

/// Create an entry through the API and return its id.
pub async fn create_entry(pool: &SqlitePool, from: &str, to: &str) -> String {
  let (status, json) = post_json(build_test_app(pool.clone()), "/entries", entry_payload(from, to)).await;
  assert_eq!(status, StatusCode::CREATED, "unexpected body: {json}");

  json["id"].as_str().unwrap().to_string()
}

pub fn ts(value: &Value) -> chrono::DateTime<chrono::FixedOffset> {
  chrono::DateTime::parse_from_rfc3339(value.as_str().unwrap()).unwrap()
}

pub fn ids(entries: &Value) -> Vec<String> {
  entries
    .as_array()
    .unwrap()
    .iter()
    .map(|entry| entry["id"].as_str().unwrap().to_string())
    .collect()
}
