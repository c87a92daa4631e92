use std::sync::Arc;

use axum::{
  extract::{FromRequest, FromRequestParts, State},
  http::{header::CONTENT_TYPE, HeaderValue, Method},
  response::IntoResponse,
  routing::get,
  Router,
};
use error::ApiError;
use serde_json::json;
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use config::ServerConfig;
use handlers::{entries::init_entries_routes, projects::init_projects_routes};

pub mod config;
pub mod entities;
pub mod error;
mod handlers;
pub mod service;
pub mod timerange;

const TEMPUS_TAG: &str = "tempus";

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
struct AppJson<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
struct AppPath<T>(T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
struct AppQuery<T>(T);

/// Handle health check requests
async fn health_handler(State(pool): State<Arc<SqlitePool>>) -> impl IntoResponse {
  let res = sqlx::query("SELECT 1").execute(&*pool).await;
  match res {
    Ok(_) => json!({
      "code": "200",
      "success": true,
    })
    .to_string(),
    Err(_) => json!({
      "code": "500",
      "success": false,
    })
    .to_string(),
  }
}

/// Applies pending schema migrations. Must succeed before serving requests.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
  sqlx::migrate!().run(pool).await
}

/// Builds the application router with its OpenAPI document and Swagger UI.
pub fn router(state: Arc<SqlitePool>, config: &ServerConfig) -> anyhow::Result<Router> {
  // Initialize cors settings
  let cors = CorsLayer::new()
    .allow_origin(config.cors_origin.parse::<HeaderValue>()?)
    .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
    .allow_headers([CONTENT_TYPE]);

  #[derive(OpenApi)]
  #[openapi(
    tags(
      (name = TEMPUS_TAG, description = "Time tracking API")
    )
  )]
  struct ApiDoc;

  let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
    .route("/health", get(health_handler))
    .merge(init_entries_routes())
    .merge(init_projects_routes())
    .layer(TraceLayer::new_for_http())
    .layer(cors)
    .with_state(state)
    .split_for_parts();

  Ok(router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api)))
}

pub async fn run(state: Arc<SqlitePool>, config: ServerConfig, cancel_token: CancellationToken) -> anyhow::Result<()> {
  let router = router(state, &config)?;

  info!("Starting api server on {}...", config.server_url());

  let listener = TcpListener::bind(config.server_url()).await?;
  axum::serve(listener, router.into_make_service())
    .with_graceful_shutdown(Box::pin(async move { cancel_token.cancelled().await }))
    .await?;

  info!("Stopped api server");

  Ok(())
}
