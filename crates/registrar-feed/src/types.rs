use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// One committed store mutation, as delivered to feed subscribers.
/// `body` carries the affected row (or just its id for deletes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ChangeRecord {
    pub id: String,
    pub seq: i64,
    pub at: DateTime<Utc>,
    pub correlation_id: Option<String>,
    pub source: ChangeSource,
    pub table: ChangeTable,
    pub op: ChangeOp,
    pub body: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Events,
    Registrations,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub enum ChangeSource {
    Api,
    Cli,
    System,
}
