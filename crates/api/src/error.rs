use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::response::{IntoResponse, Response};
use axum::{http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

use crate::entities::entry::RichEntry;

pub type ApiResult<T = ()> = Result<T, ApiError>;

const INTERNAL_ERROR_MESSAGE: &str = "an internal server error occurred";

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Project `{0}` is not found")]
  ProjectNotFound(Uuid),
  #[error("Entry `{0}` is not found")]
  EntryNotFound(Uuid),
  #[error("Entry `{0}` was not found after fetching")]
  EntryVanished(Uuid),
  #[error("At least another entry in time. See conflicts field")]
  Conflict(Vec<RichEntry>),
  #[error("{0}")]
  InvalidInterval(String),
  #[error("{0}")]
  InvalidTimestamp(String),
  #[error("Database error: {0}")]
  DatabaseError(#[from] SqlxError),
  #[error(transparent)]
  JsonRejection(JsonRejection),
  #[error(transparent)]
  PathRejection(PathRejection),
  #[error(transparent)]
  QueryRejection(QueryRejection),
  #[error("payload is not valid. see details for more")]
  InvalidInputError(#[from] validator::ValidationErrors),
  #[error("an internal server error occurred")]
  Anyhow(#[from] anyhow::Error),
}

impl ApiError {
  pub fn response(self) -> (StatusCode, AppResponseError) {
    use ApiError::*;
    // storage failures are logged in full but never echoed to the client
    let message = match &self {
      DatabaseError(_) => INTERNAL_ERROR_MESSAGE.to_string(),
      _ => self.to_string(),
    };

    let (kind, details, conflicts, status_code) = match self {
      JsonRejection(rejection) => (
        "INVALID_INPUT_ERROR",
        vec![(rejection.status().to_string(), vec![rejection.body_text()])],
        vec![],
        StatusCode::BAD_REQUEST,
      ),
      PathRejection(rejection) => (
        "INVALID_INPUT_ERROR",
        vec![(rejection.status().to_string(), vec![rejection.body_text()])],
        vec![],
        StatusCode::BAD_REQUEST,
      ),
      QueryRejection(rejection) => (
        "INVALID_INPUT_ERROR",
        vec![(rejection.status().to_string(), vec![rejection.body_text()])],
        vec![],
        StatusCode::BAD_REQUEST,
      ),
      InvalidInputError(err) => (
        "INVALID_INPUT_ERROR",
        err
          .field_errors()
          .into_iter()
          .map(|(p, e)| {
            (
              p.to_string(),
              e.iter().map(|err| err.code.to_string()).collect::<Vec<String>>(),
            )
          })
          .collect(),
        vec![],
        StatusCode::BAD_REQUEST,
      ),
      InvalidTimestamp(_) => ("INVALID_INPUT_ERROR", vec![], vec![], StatusCode::BAD_REQUEST),
      InvalidInterval(_) => ("INVALID_INTERVAL", vec![], vec![], StatusCode::BAD_REQUEST),
      ProjectNotFound(_) | EntryNotFound(_) => ("RESOURCE_NOT_FOUND", vec![], vec![], StatusCode::NOT_FOUND),
      Conflict(conflicts) => ("CONFLICT", vec![], conflicts, StatusCode::CONFLICT),
      EntryVanished(id) => {
        tracing::error!("Entry {} disappeared between fetch and update", id);

        (
          "INTERNAL_INCONSISTENCY",
          vec![],
          vec![],
          StatusCode::INTERNAL_SERVER_ERROR,
        )
      },
      DatabaseError(ref e) => {
        tracing::error!("Database error: {:?}", e);

        ("INTERNAL_SERVER_ERROR", vec![], vec![], StatusCode::INTERNAL_SERVER_ERROR)
      },
      Anyhow(ref e) => {
        tracing::error!("Generic error: {:?}", e);

        ("INTERNAL_SERVER_ERROR", vec![], vec![], StatusCode::INTERNAL_SERVER_ERROR)
      },
    };

    (
      status_code,
      AppResponseError::new(kind, message, None, details).with_conflicts(conflicts),
    )
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status_code, body) = self.response();
    (status_code, Json(body)).into_response()
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    Self::JsonRejection(rejection)
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    Self::PathRejection(rejection)
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    Self::QueryRejection(rejection)
  }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppResponseError {
  pub kind: String,
  pub error_message: String,
  pub code: Option<i32>,
  pub details: Vec<(String, Vec<String>)>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub conflicts: Vec<RichEntry>,
}

impl AppResponseError {
  pub fn new(
    kind: impl Into<String>,
    message: impl Into<String>,
    code: Option<i32>,
    details: Vec<(String, Vec<String>)>,
  ) -> Self {
    Self {
      kind: kind.into(),
      error_message: message.into(),
      code,
      details,
      conflicts: vec![],
    }
  }

  pub fn with_conflicts(mut self, conflicts: Vec<RichEntry>) -> Self {
    self.conflicts = conflicts;
    self
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_codes() {
    let id = Uuid::new_v4();

    assert_eq!(ApiError::EntryNotFound(id).response().0, StatusCode::NOT_FOUND);
    assert_eq!(ApiError::ProjectNotFound(id).response().0, StatusCode::NOT_FOUND);
    assert_eq!(ApiError::EntryVanished(id).response().0, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(ApiError::Conflict(vec![]).response().0, StatusCode::CONFLICT);
    assert_eq!(
      ApiError::InvalidInterval("reversed".into()).response().0,
      StatusCode::BAD_REQUEST
    );
    assert_eq!(
      ApiError::InvalidTimestamp("ts".into()).response().0,
      StatusCode::BAD_REQUEST
    );
  }

  #[test]
  fn test_validation_details() {
    let mut errors = validator::ValidationErrors::new();
    errors.add("description", validator::ValidationError::new("length"));

    let (status, body) = ApiError::InvalidInputError(errors).response();

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.kind, "INVALID_INPUT_ERROR");
    assert_eq!(body.details, vec![("description".to_string(), vec!["length".to_string()])]);
  }

  #[test]
  fn test_internal_errors_hide_details() {
    let (status, body) = ApiError::DatabaseError(SqlxError::Protocol(
      "CHECK constraint failed: time_entry".into(),
    ))
    .response();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.kind, "INTERNAL_SERVER_ERROR");
    assert_eq!(body.error_message, "an internal server error occurred");
    assert!(!body.error_message.contains("CHECK"));

    let (status, body) = ApiError::Anyhow(anyhow::anyhow!("pool exhausted at 10.0.0.4")).response();

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.error_message, "an internal server error occurred");
  }
}
