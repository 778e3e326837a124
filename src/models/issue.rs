use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};
use time::OffsetDateTime;

use crate::models::user::UserRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Open,
    InProgress,
    Resolved,
    Closed,
    Reopened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_priority", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_severity", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Blocker,
    Major,
    Minor,
    Trivial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Type)]
#[sqlx(type_name = "issue_type", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueType {
    Bug,
    Feature,
    Improvement,
    Task,
}

macro_rules! enum_from_str {
    ($name:ident { $($text:literal => $variant:ident),+ $(,)? }) => {
        impl FromStr for $name {
            type Err = ();

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(()),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $(Self::$variant => $text,)+
                };
                write!(f, "{}", text)
            }
        }
    };
}

enum_from_str!(Status {
    "OPEN" => Open,
    "IN_PROGRESS" => InProgress,
    "RESOLVED" => Resolved,
    "CLOSED" => Closed,
    "REOPENED" => Reopened,
});

enum_from_str!(Priority {
    "CRITICAL" => Critical,
    "HIGH" => High,
    "MEDIUM" => Medium,
    "LOW" => Low,
});

enum_from_str!(Severity {
    "BLOCKER" => Blocker,
    "MAJOR" => Major,
    "MINOR" => Minor,
    "TRIVIAL" => Trivial,
});

enum_from_str!(IssueType {
    "BUG" => Bug,
    "FEATURE" => Feature,
    "IMPROVEMENT" => Improvement,
    "TASK" => Task,
});

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub steps_to_reproduce: Option<String>,
    pub priority: Priority,
    pub severity: Severity,
    #[serde(rename = "type")]
    #[sqlx(rename = "issue_type")]
    pub issue_type: IssueType,
    pub product: Option<String>,
    pub version: Option<String>,
    pub status: Status,
    pub reporter_id: i32,
    pub assignee_id: Option<i32>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Wire form of an issue: the row plus reporter/assignee projections.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueWithRelations {
    #[serde(flatten)]
    pub issue: Issue,
    pub reporter: UserRef,
    pub assignee: Option<UserRef>,
}

/// Validated input for issue creation. Status is not part of this type:
/// new issues always start OPEN.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub title: String,
    pub description: String,
    pub steps_to_reproduce: Option<String>,
    pub priority: Priority,
    pub severity: Severity,
    pub issue_type: IssueType,
    pub product: Option<String>,
    pub version: Option<String>,
    pub assignee_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            Status::Open,
            Status::InProgress,
            Status::Resolved,
            Status::Closed,
            Status::Reopened,
        ] {
            assert_eq!(status.to_string().parse::<Status>(), Ok(status));
        }
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        assert!("open".parse::<Status>().is_err());
        assert!("URGENT".parse::<Priority>().is_err());
        assert!("".parse::<IssueType>().is_err());
    }

    #[test]
    fn serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }
}
