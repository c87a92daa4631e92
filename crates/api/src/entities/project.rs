use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::{fmt::Hyphenated, Uuid};

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Project {
  #[sqlx(try_from = "Hyphenated")]
  pub id: Uuid,
  pub customer_name: String,
  pub project_name: String,
}
