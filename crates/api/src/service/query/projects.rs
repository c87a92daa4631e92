use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{entities::project::Project, error::ApiResult};

const LIST_PROJECTS_QUERY: &str = "SELECT id, customer_name, project_name FROM project ORDER BY project_name ASC";
const FIND_PROJECT_BY_ID_QUERY: &str = "SELECT id, customer_name, project_name FROM project WHERE id = ?1";

/// Fetches every project ordered by project name
pub async fn list_all(pool: &SqlitePool) -> ApiResult<Vec<Project>> {
  sqlx::query_as::<_, Project>(LIST_PROJECTS_QUERY)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Finds a project by its ID
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `id` - Project UUID to search for
///
/// # Returns
/// Optional Project if found
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> ApiResult<Option<Project>> {
  sqlx::query_as::<_, Project>(FIND_PROJECT_BY_ID_QUERY)
    .bind(id.hyphenated())
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}
