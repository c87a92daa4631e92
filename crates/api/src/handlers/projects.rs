use std::sync::Arc;

use axum::{extract::State, Json};
use sqlx::SqlitePool;
use tracing::{debug, instrument};
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;

use crate::{
  entities::project::Project,
  error::{ApiError, ApiResult},
  service::query,
  AppPath,
};

const PROJECTS_TAG: &str = "projects";

pub fn init_projects_routes() -> OpenApiRouter<Arc<SqlitePool>> {
  OpenApiRouter::new()
    .routes(routes!(list_projects))
    .routes(routes!(get_project))
}

#[utoipa::path(
  get,
  path = "/projects",
  tag = PROJECTS_TAG,
  responses(
    (status = 200, description = "List all projects ordered by name", body = [Project])
  )
)]
#[instrument(skip(pool))]
async fn list_projects(State(pool): State<Arc<SqlitePool>>) -> ApiResult<Json<Vec<Project>>> {
  let projects = query::projects::list_all(&pool).await?;

  Ok(Json(projects))
}

#[utoipa::path(
  get,
  path = "/projects/{id}",
  tag = PROJECTS_TAG,
  params(
    ("id" = Uuid, Path, description = "Project id")
  ),
  responses(
    (status = 200, description = "Project found", body = Project),
    (status = 400, description = "Id is not a UUID"),
    (status = 404, description = "No project with this id"),
  )
)]
#[instrument(skip(pool), fields(project_id = %id))]
async fn get_project(State(pool): State<Arc<SqlitePool>>, AppPath(id): AppPath<Uuid>) -> ApiResult<Json<Project>> {
  debug!("Fetch project with id {}", id);

  let project = query::projects::find_by_id(&pool, id)
    .await?
    .ok_or(ApiError::ProjectNotFound(id))?;

  Ok(Json(project))
}
