use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
  entities::entry::{NewEntry, PatchEntry},
  error::{ApiError, ApiResult},
  service::query,
};

// Inserts only when no stored interval touches [?4, ?5] (epoch millis). A single
// statement runs under the SQLite write lock, so two racing creations cannot both pass.
const INSERT_ENTRY: &str = r#"
  INSERT INTO time_entry (id, time_from, time_to, from_ms, to_ms, project_id, break_duration_minutes, description)
  SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8
  WHERE NOT EXISTS (
    SELECT 1 FROM time_entry
    WHERE from_ms <= ?5 AND to_ms >= ?4
  )
"#;

const PATCH_ENTRY: &str = r#"
  UPDATE time_entry
  SET time_from = COALESCE(?1, time_from),
      time_to = COALESCE(?2, time_to),
      from_ms = COALESCE(?3, from_ms),
      to_ms = COALESCE(?4, to_ms),
      break_duration_minutes = COALESCE(?5, break_duration_minutes),
      description = COALESCE(?6, description)
  WHERE id = ?7
"#;

const DELETE_ENTRY: &str = "DELETE FROM time_entry WHERE id = ?1";

/// Creates a new entry and returns its generated id
///
/// # Errors
/// - ProjectNotFound if `project_id` does not resolve
/// - Conflict if another entry overlaps the interval at insert time
/// - DatabaseError for any database-related issues
pub async fn create(pool: &SqlitePool, params: &NewEntry) -> ApiResult<Uuid> {
  ensure_project_exists(pool, params.project_id).await?;

  let id = Uuid::new_v4();

  let inserted = sqlx::query(INSERT_ENTRY)
    .bind(id.hyphenated())
    .bind(params.from)
    .bind(params.to)
    .bind(params.from.timestamp_millis())
    .bind(params.to.timestamp_millis())
    .bind(params.project_id.hyphenated())
    .bind(params.break_duration_minutes)
    .bind(&params.description)
    .execute(pool)
    .await?
    .rows_affected();

  if inserted == 0 {
    let conflicts = query::entries::list_overlapping(pool, params.from, params.to).await?;
    return Err(ApiError::Conflict(conflicts));
  }

  Ok(id)
}

/// Updates the fields present in `params`, keeping the stored value of the rest
///
/// # Errors
/// - EntryNotFound if no row matched `id` at update time
/// - DatabaseError for any database-related issues
pub async fn patch(pool: &SqlitePool, id: Uuid, params: &PatchEntry) -> ApiResult<()> {
  let updated = sqlx::query(PATCH_ENTRY)
    .bind(params.from)
    .bind(params.to)
    .bind(params.from.map(|from| from.timestamp_millis()))
    .bind(params.to.map(|to| to.timestamp_millis()))
    .bind(params.break_duration_minutes)
    .bind(params.description.as_deref())
    .bind(id.hyphenated())
    .execute(pool)
    .await?
    .rows_affected();

  if updated == 0 {
    return Err(ApiError::EntryNotFound(id));
  }

  Ok(())
}

/// Deletes an entry by ID, returning the number of removed rows
///
/// Deleting an id that does not exist is not an error.
pub async fn delete(pool: &SqlitePool, id: Uuid) -> ApiResult<u64> {
  Ok(
    sqlx::query(DELETE_ENTRY)
      .bind(id.hyphenated())
      .execute(pool)
      .await?
      .rows_affected(),
  )
}

async fn ensure_project_exists(pool: &SqlitePool, project_id: Uuid) -> ApiResult<()> {
  match query::projects::find_by_id(pool, project_id).await? {
    Some(_) => Ok(()),
    None => Err(ApiError::ProjectNotFound(project_id)),
  }
}
