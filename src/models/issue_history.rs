use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::models::issue::Status;

/// Append-only audit record of a status transition. The first row for an
/// issue is written in the same transaction that creates the issue, with
/// `from_status == to_status == OPEN`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct IssueHistory {
    pub id: i32,
    pub issue_id: i32,
    pub changed_by_id: i32,
    pub from_status: Status,
    pub to_status: Status,
    pub note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub const ISSUE_CREATED_NOTE: &str = "Issue created";
