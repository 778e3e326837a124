//! Translates the raw, untrusted query string of `GET /api/issues` into a
//! typed, bounded query description. Every recognized key is an explicit
//! field; unrecognized keys are rejected at the extractor through
//! `deny_unknown_fields` instead of being passed through to the storage
//! layer.

use serde::Deserialize;
use thiserror::Error;

use crate::models::issue::{IssueType, Priority, Status};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query-string shape accepted by the issue list endpoint. All values arrive
/// as strings and are parsed by [`IssueQuery::parse`] so that malformed input
/// fails with a descriptive client error rather than a serde rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawListParams {
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(rename = "type")]
    pub issue_type: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Invalid value '{value}' for '{param}' filter")]
    InvalidFilterValue { param: &'static str, value: String },
    #[error("'{param}' must be an integer")]
    InvalidInteger { param: &'static str },
    #[error("Unknown sort field '{0}'")]
    UnknownSortField(String),
}

/// Equality filters combined with AND; the free-text term matches title OR
/// description case-insensitively. Absent fields impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub issue_type: Option<IssueType>,
    pub assignee_id: Option<i32>,
    pub reporter_id: Option<i32>,
    pub search: Option<String>,
}

/// Allow-listed sortable attributes. Anything else fails closed: the field
/// name is never interpolated into SQL from client input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Title,
    Priority,
    Severity,
    Status,
    Id,
}

impl SortField {
    fn parse(value: &str) -> Result<Self, QueryError> {
        match value {
            "createdAt" => Ok(Self::CreatedAt),
            "updatedAt" => Ok(Self::UpdatedAt),
            "title" => Ok(Self::Title),
            "priority" => Ok(Self::Priority),
            "severity" => Ok(Self::Severity),
            "status" => Ok(Self::Status),
            "id" => Ok(Self::Id),
            other => Err(QueryError::UnknownSortField(other.to_string())),
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
            Self::Priority => "priority",
            Self::Severity => "severity",
            Self::Status => "status",
            Self::Id => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueQuery {
    pub filter: IssueFilter,
    pub sort: SortField,
    pub order: SortOrder,
    pub page: u32,
    pub page_size: u32,
}

impl IssueQuery {
    /// Normalizes pagination leniently (absent or unparsable values fall back
    /// to defaults, out-of-range values are clamped) but fails closed on
    /// malformed filter values and unknown sort fields.
    pub fn parse(raw: RawListParams) -> Result<Self, QueryError> {
        let page = lenient_u32(raw.page.as_deref(), 1).max(1);
        let page_size = lenient_u32(raw.page_size.as_deref(), DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let sort = match present(raw.sort.as_deref()) {
            Some(value) => SortField::parse(value)?,
            None => SortField::default(),
        };
        let order = match present(raw.order.as_deref()) {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        };

        let filter = IssueFilter {
            status: parse_enum_filter(raw.status.as_deref(), "status")?,
            priority: parse_enum_filter(raw.priority.as_deref(), "priority")?,
            issue_type: parse_enum_filter(raw.issue_type.as_deref(), "type")?,
            assignee_id: parse_int_filter(raw.assignee.as_deref(), "assignee")?,
            reporter_id: parse_int_filter(raw.reporter.as_deref(), "reporter")?,
            search: present(raw.search.as_deref()).map(str::to_string),
        };

        Ok(Self {
            filter,
            sort,
            order,
            page,
            page_size,
        })
    }

    pub fn skip(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let page_size = i64::from(self.page_size);
        (total + page_size - 1) / page_size
    }
}

/// Empty strings behave like absent parameters, matching how the UI builds
/// its URLs.
fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn lenient_u32(value: Option<&str>, default: u32) -> u32 {
    present(value)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_enum_filter<T: std::str::FromStr>(
    value: Option<&str>,
    param: &'static str,
) -> Result<Option<T>, QueryError> {
    match present(value) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| QueryError::InvalidFilterValue {
                param,
                value: raw.to_string(),
            }),
        None => Ok(None),
    }
}

fn parse_int_filter(
    value: Option<&str>,
    param: &'static str,
) -> Result<Option<i32>, QueryError> {
    match present(value) {
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| QueryError::InvalidInteger { param }),
        None => Ok(None),
    }
}
