use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::{debug, info, instrument};
use utoipa::IntoParams;
use utoipa_axum::{router::OpenApiRouter, routes};
use uuid::Uuid;
use validator::Validate;

use crate::{
  entities::entry::{NewEntry, PatchEntry, RichEntry},
  error::{ApiError, ApiResult},
  service::{mutation, query},
  timerange, AppJson, AppPath, AppQuery,
};

const ENTRIES_TAG: &str = "entries";
const DEFAULT_OFFSET: i64 = 0;

pub fn init_entries_routes() -> OpenApiRouter<Arc<SqlitePool>> {
  OpenApiRouter::new()
    .routes(routes!(list_entries, create_entry))
    .routes(routes!(get_entry, patch_entry, delete_entry))
    .routes(routes!(list_entries_between))
    .routes(routes!(list_entries_by_day))
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
struct ListEntriesParams {
  /// Maximum number of entries, all when omitted
  #[validate(range(min = 1))]
  limit: Option<i64>,
  /// Number of entries to skip
  #[validate(range(min = 0))]
  offset: Option<i64>,
}

#[utoipa::path(
  get,
  path = "/entries",
  tag = ENTRIES_TAG,
  params(
    ListEntriesParams
  ),
  responses(
    (status = 200, description = "List entries ordered by start", body = [RichEntry])
  )
)]
#[instrument(skip(pool))]
async fn list_entries(
  State(pool): State<Arc<SqlitePool>>,
  AppQuery(params): AppQuery<ListEntriesParams>,
) -> ApiResult<Json<Vec<RichEntry>>> {
  params.validate()?;

  let limit = params.limit.unwrap_or(query::entries::NO_LIMIT);
  let offset = params.offset.unwrap_or(DEFAULT_OFFSET);

  let entries = query::entries::list(&pool, limit, offset).await?;

  Ok(Json(entries))
}

#[utoipa::path(
  get,
  path = "/entries/{id}",
  tag = ENTRIES_TAG,
  params(
    ("id" = Uuid, Path, description = "Entry id")
  ),
  responses(
    (status = 200, description = "Entry found", body = RichEntry),
    (status = 400, description = "Id is not a UUID"),
    (status = 404, description = "No entry with this id"),
  )
)]
#[instrument(skip(pool), fields(entry_id = %id))]
async fn get_entry(State(pool): State<Arc<SqlitePool>>, AppPath(id): AppPath<Uuid>) -> ApiResult<Json<RichEntry>> {
  let entry = query::entries::find_by_id(&pool, id)
    .await?
    .ok_or(ApiError::EntryNotFound(id))?;

  Ok(Json(entry))
}

#[utoipa::path(
  get,
  path = "/entries-between/{ts1}/{ts2}",
  tag = ENTRIES_TAG,
  params(
    ("ts1" = String, Path, description = "Interval start, RFC 3339 with offset"),
    ("ts2" = String, Path, description = "Interval end, RFC 3339 with offset"),
  ),
  responses(
    (status = 200, description = "Entries touching the interval", body = [RichEntry]),
    (status = 400, description = "Malformed timestamp or reversed interval"),
  )
)]
#[instrument(skip(pool))]
async fn list_entries_between(
  State(pool): State<Arc<SqlitePool>>,
  AppPath((ts1, ts2)): AppPath<(String, String)>,
) -> ApiResult<Json<Vec<RichEntry>>> {
  let from = timerange::parse_timestamp("ts1", &ts1)?;
  let to = timerange::parse_timestamp("ts2", &ts2)?;

  let entries = entries_between(&pool, from, to).await?;

  Ok(Json(entries))
}

#[utoipa::path(
  get,
  path = "/days/{ts}",
  tag = ENTRIES_TAG,
  params(
    ("ts" = String, Path, description = "Any instant of the day, RFC 3339 with offset"),
  ),
  responses(
    (status = 200, description = "Entries touching the calendar day of ts", body = [RichEntry]),
    (status = 400, description = "Malformed timestamp"),
  )
)]
#[instrument(skip(pool))]
async fn list_entries_by_day(
  State(pool): State<Arc<SqlitePool>>,
  AppPath(ts): AppPath<String>,
) -> ApiResult<Json<Vec<RichEntry>>> {
  let ts = timerange::parse_timestamp("ts", &ts)?;
  let (from, to) = timerange::day_bounds(ts)?;

  debug!("Day of {} spans {} to {}", ts, from, to);

  let entries = entries_between(&pool, from, to).await?;

  Ok(Json(entries))
}

#[utoipa::path(
  post,
  path = "/entries",
  tag = ENTRIES_TAG,
  request_body = NewEntry,
  responses(
    (status = 201, description = "Entry created successfully", body = RichEntry),
    (status = 400, description = "Invalid payload or interval"),
    (status = 404, description = "Referenced project does not exist"),
    (status = 409, description = "Interval collides with the entries listed in `conflicts`"),
  )
)]
#[instrument(skip(pool, input))]
async fn create_entry(
  State(pool): State<Arc<SqlitePool>>,
  AppJson(input): AppJson<NewEntry>,
) -> ApiResult<(StatusCode, Json<RichEntry>)> {
  debug!("Register new entry with request: {:?}", input);

  input.validate()?;
  timerange::ensure_ordered(input.from, input.to)?;

  let conflicts = query::entries::list_overlapping(&pool, input.from, input.to).await?;
  if !conflicts.is_empty() {
    debug!("Entry collides with {} existing entries", conflicts.len());

    return Err(ApiError::Conflict(conflicts));
  }

  let id = mutation::entries::create(&pool, &input).await?;

  let entry = query::entries::find_by_id(&pool, id)
    .await?
    .ok_or(ApiError::EntryVanished(id))?;

  info!("Created entry {}", id);

  Ok((StatusCode::CREATED, Json(entry)))
}

#[utoipa::path(
  patch,
  path = "/entries/{id}",
  tag = ENTRIES_TAG,
  params(
    ("id" = Uuid, Path, description = "Entry id")
  ),
  request_body = PatchEntry,
  responses(
    (status = 200, description = "Entry updated successfully", body = RichEntry),
    (status = 400, description = "Invalid payload or resulting interval"),
    (status = 404, description = "No entry with this id"),
    (status = 500, description = "Entry disappeared while updating"),
  )
)]
#[instrument(skip(pool, input), fields(entry_id = %id))]
async fn patch_entry(
  State(pool): State<Arc<SqlitePool>>,
  AppPath(id): AppPath<Uuid>,
  AppJson(input): AppJson<PatchEntry>,
) -> ApiResult<Json<RichEntry>> {
  debug!("Update entry with id {} and params {:?}", id, input);

  let current = query::entries::find_by_id(&pool, id)
    .await?
    .ok_or(ApiError::EntryNotFound(id))?;

  input.validate()?;

  let (from, to) = input.prospective_interval(&current);
  timerange::ensure_ordered(from, to)?;

  // Overlaps are not re-checked here, only ordering.
  mutation::entries::patch(&pool, id, &input).await.map_err(|err| match err {
    ApiError::EntryNotFound(id) => ApiError::EntryVanished(id),
    err => err,
  })?;

  let entry = query::entries::find_by_id(&pool, id)
    .await?
    .ok_or(ApiError::EntryVanished(id))?;

  Ok(Json(entry))
}

#[utoipa::path(
  delete,
  path = "/entries/{id}",
  tag = ENTRIES_TAG,
  params(
    ("id" = Uuid, Path, description = "Entry id")
  ),
  responses(
    (status = 204, description = "Entry is gone, whether or not it existed"),
    (status = 400, description = "Id is not a UUID"),
  )
)]
#[instrument(skip(pool), fields(entry_id = %id))]
async fn delete_entry(State(pool): State<Arc<SqlitePool>>, AppPath(id): AppPath<Uuid>) -> ApiResult<StatusCode> {
  debug!("Remove entry with id {}", id);

  let removed = mutation::entries::delete(&pool, id).await?;
  if removed > 0 {
    info!("Deleted entry {}", id);
  }

  Ok(StatusCode::NO_CONTENT)
}

async fn entries_between(
  pool: &SqlitePool,
  from: DateTime<FixedOffset>,
  to: DateTime<FixedOffset>,
) -> ApiResult<Vec<RichEntry>> {
  timerange::ensure_ordered(from, to)?;

  query::entries::list_overlapping(pool, from, to).await
}
