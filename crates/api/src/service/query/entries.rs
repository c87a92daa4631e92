use chrono::{DateTime, FixedOffset};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{entities::entry::RichEntry, error::ApiResult};

const RICH_ENTRY_COLUMNS: &str = r#"
    entry_id,
    time_from,
    time_to,
    project_id,
    break_duration_minutes,
    description,
    customer_name,
    project_name
"#;

/// Unbounded `LIMIT` in SQLite.
pub const NO_LIMIT: i64 = -1;

/// Fetches entries with their project names, ordered by start instant
///
/// # Arguments
/// * `pool` - The database connection pool
/// * `limit` - Maximum number of entries, [`NO_LIMIT`] for all
/// * `offset` - Number of entries to skip
pub async fn list(pool: &SqlitePool, limit: i64, offset: i64) -> ApiResult<Vec<RichEntry>> {
  let query = format!(
    "SELECT {RICH_ENTRY_COLUMNS} FROM time_entry_project_view \
     ORDER BY from_ms, entry_id LIMIT ?1 OFFSET ?2"
  );

  sqlx::query_as::<_, RichEntry>(&query)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}

/// Finds an entry by its ID
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> ApiResult<Option<RichEntry>> {
  let query = format!("SELECT {RICH_ENTRY_COLUMNS} FROM time_entry_project_view WHERE entry_id = ?1");

  sqlx::query_as::<_, RichEntry>(&query)
    .bind(id.hyphenated())
    .fetch_optional(pool)
    .await
    .map_err(Into::into)
}

/// Fetches every entry whose interval intersects `[from, to]`
///
/// Boundaries are inclusive: an entry ending exactly at `from` or starting
/// exactly at `to` is part of the result. Instants are compared as epoch
/// milliseconds.
pub async fn list_overlapping(
  pool: &SqlitePool,
  from: DateTime<FixedOffset>,
  to: DateTime<FixedOffset>,
) -> ApiResult<Vec<RichEntry>> {
  let query = format!(
    "SELECT {RICH_ENTRY_COLUMNS} FROM time_entry_project_view \
     WHERE from_ms <= ?2 AND to_ms >= ?1 \
     ORDER BY from_ms, entry_id"
  );

  sqlx::query_as::<_, RichEntry>(&query)
    .bind(from.timestamp_millis())
    .bind(to.timestamp_millis())
    .fetch_all(pool)
    .await
    .map_err(Into::into)
}
