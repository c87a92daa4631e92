use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::{fmt::Hyphenated, Uuid};
use validator::{Validate, ValidationError};

use crate::timerange;

/// Time entry joined with the display fields of its project.
///
/// Only produced by read queries against `time_entry_project_view`.
#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RichEntry {
  #[sqlx(rename = "entry_id", try_from = "Hyphenated")]
  pub id: Uuid,
  #[sqlx(rename = "time_from")]
  pub from: DateTime<FixedOffset>,
  #[sqlx(rename = "time_to")]
  pub to: DateTime<FixedOffset>,
  #[sqlx(try_from = "Hyphenated")]
  pub project_id: Uuid,
  pub break_duration_minutes: i64,
  pub description: String,
  pub customer_name: String,
  pub project_name: String,
}

/// Payload for creating an entry. The id is assigned on insert.
#[derive(Serialize, Deserialize, Debug, Clone, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEntry {
  #[serde(deserialize_with = "timerange::deserialize_timestamp")]
  pub from: DateTime<FixedOffset>,
  #[serde(deserialize_with = "timerange::deserialize_timestamp")]
  pub to: DateTime<FixedOffset>,
  pub project_id: Uuid,
  #[validate(range(min = 0))]
  pub break_duration_minutes: i64,
  #[validate(length(min = 1))]
  pub description: String,
}

/// Partial update of an entry. The project of an entry cannot be changed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_patch_not_empty"))]
pub struct PatchEntry {
  #[serde(default, deserialize_with = "timerange::deserialize_optional_timestamp")]
  pub from: Option<DateTime<FixedOffset>>,
  #[serde(default, deserialize_with = "timerange::deserialize_optional_timestamp")]
  pub to: Option<DateTime<FixedOffset>>,
  #[validate(range(min = 0))]
  pub break_duration_minutes: Option<i64>,
  #[validate(length(min = 1))]
  pub description: Option<String>,
}

impl PatchEntry {
  pub fn is_empty(&self) -> bool {
    self.from.is_none() && self.to.is_none() && self.break_duration_minutes.is_none() && self.description.is_none()
  }

  /// Interval the entry would have after this patch, without touching storage.
  pub fn prospective_interval(&self, current: &RichEntry) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
    (self.from.unwrap_or(current.from), self.to.unwrap_or(current.to))
  }
}

fn validate_patch_not_empty(patch: &PatchEntry) -> Result<(), ValidationError> {
  if patch.is_empty() {
    return Err(ValidationError::new("at_least_one_field_required"));
  }

  Ok(())
}
