use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calendar entry excluding `[start_date, end_date]` from working-day
/// counts. Entries may overlap; day membership in the union is what counts.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDay {
    pub id: Uuid,
    pub kind: ExceptionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExceptionDayInput {
    pub kind: ExceptionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "exception_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ExceptionKind {
    Holiday,
    Weekend,
}
