use serde::Deserialize;
use serde::Serialize;

/// One row of the paginated alliance list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllianceSummary {
  pub id: i64,
  pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllianceRow {
  pub id: i64,
  pub name: String,
  pub chat_id: Option<i64>, // bound group chat, if any
}
