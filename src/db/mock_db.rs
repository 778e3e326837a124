use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::models::issue::{Issue, IssueWithRelations, NewIssue, Status};
use crate::models::issue_history::{IssueHistory, ISSUE_CREATED_NOTE};
use crate::models::user::{PublicUser, User, UserRef};
use crate::query::{IssueQuery, SortField, SortOrder};

use super::issue_repository::{IssuePage, IssueRepository};
use super::user_repository::UserRepository;

/// In-memory stand-in for both repositories. Applies the same filter, sort
/// and pagination semantics as the Postgres implementation so handler tests
/// can assert on real result sets.
#[derive(Default)]
pub struct MockDb {
    pub users: Vec<User>,
    pub issues: Mutex<Vec<IssueWithRelations>>,
    pub history: Mutex<Vec<IssueHistory>>,
    pub should_fail: bool,
    /// Simulates the audit insert failing mid-transaction: the issue row
    /// must not persist either.
    pub fail_history_insert: bool,
    pub list_calls: AtomicUsize,
}

impl MockDb {
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            users,
            ..Default::default()
        }
    }

    fn user_ref(&self, user_id: i32) -> Option<UserRef> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .map(User::as_ref_projection)
    }
}

fn mock_failure() -> sqlx::Error {
    sqlx::Error::Protocol("Mock DB failure".into())
}

fn matches(entry: &IssueWithRelations, query: &IssueQuery) -> bool {
    let issue = &entry.issue;
    let filter = &query.filter;

    if filter.status.is_some_and(|status| issue.status != status) {
        return false;
    }
    if filter
        .priority
        .is_some_and(|priority| issue.priority != priority)
    {
        return false;
    }
    if filter
        .issue_type
        .is_some_and(|issue_type| issue.issue_type != issue_type)
    {
        return false;
    }
    if filter
        .assignee_id
        .is_some_and(|assignee| issue.assignee_id != Some(assignee))
    {
        return false;
    }
    if filter
        .reporter_id
        .is_some_and(|reporter| issue.reporter_id != reporter)
    {
        return false;
    }
    if let Some(term) = &filter.search {
        let needle = term.to_lowercase();
        let in_title = issue.title.to_lowercase().contains(&needle);
        let in_description = issue.description.to_lowercase().contains(&needle);
        if !in_title && !in_description {
            return false;
        }
    }

    true
}

fn compare(a: &IssueWithRelations, b: &IssueWithRelations, query: &IssueQuery) -> Ordering {
    let (a, b) = (&a.issue, &b.issue);
    let primary = match query.sort {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
        SortField::Priority => a.priority.cmp(&b.priority),
        SortField::Severity => a.severity.cmp(&b.severity),
        SortField::Status => a.status.cmp(&b.status),
        SortField::Id => Ordering::Equal,
    };
    let ordering = primary.then(a.id.cmp(&b.id));
    match query.order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    }
}

#[async_trait]
impl UserRepository for MockDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.users.iter().find(|user| user.email == email).cloned())
    }

    async fn find_public_user_by_id(
        &self,
        user_id: i32,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self
            .users
            .iter()
            .find(|user| user.id == user_id)
            .map(|user| PublicUser {
                id: user.id,
                email: user.email.clone(),
                name: user.name.clone(),
                role: user.role,
                avatar_url: user.avatar_url.clone(),
            }))
    }

    async fn user_exists(&self, user_id: i32) -> Result<bool, sqlx::Error> {
        if self.should_fail {
            return Err(mock_failure());
        }
        Ok(self.users.iter().any(|user| user.id == user_id))
    }
}

#[async_trait]
impl IssueRepository for MockDb {
    async fn list_issues(&self, query: &IssueQuery) -> Result<IssuePage, sqlx::Error> {
        self.list_calls.fetch_add(1, AtomicOrdering::SeqCst);
        if self.should_fail {
            return Err(mock_failure());
        }

        let issues = self.issues.lock().unwrap();
        let mut matching: Vec<IssueWithRelations> = issues
            .iter()
            .filter(|entry| matches(entry, query))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, query));

        let total = matching.len() as i64;
        let page: Vec<IssueWithRelations> = matching
            .into_iter()
            .skip(query.skip() as usize)
            .take(query.limit() as usize)
            .collect();

        Ok(IssuePage {
            issues: page,
            total,
        })
    }

    async fn create_issue(
        &self,
        reporter_id: i32,
        issue: NewIssue,
    ) -> Result<IssueWithRelations, sqlx::Error> {
        if self.should_fail || self.fail_history_insert {
            return Err(mock_failure());
        }

        let reporter = self.user_ref(reporter_id).ok_or(sqlx::Error::RowNotFound)?;
        let assignee = issue.assignee_id.and_then(|id| self.user_ref(id));

        let mut issues = self.issues.lock().unwrap();
        let id = issues.iter().map(|entry| entry.issue.id).max().unwrap_or(0) + 1;
        let now = OffsetDateTime::now_utc();

        let created = IssueWithRelations {
            issue: Issue {
                id,
                title: issue.title,
                description: issue.description,
                steps_to_reproduce: issue.steps_to_reproduce,
                priority: issue.priority,
                severity: issue.severity,
                issue_type: issue.issue_type,
                product: issue.product,
                version: issue.version,
                status: Status::Open,
                reporter_id,
                assignee_id: issue.assignee_id,
                created_at: now,
                updated_at: now,
            },
            reporter,
            assignee,
        };

        issues.push(created.clone());

        let mut history = self.history.lock().unwrap();
        let history_id = history.len() as i32 + 1;
        history.push(IssueHistory {
            id: history_id,
            issue_id: id,
            changed_by_id: reporter_id,
            from_status: Status::Open,
            to_status: Status::Open,
            note: Some(ISSUE_CREATED_NOTE.to_string()),
            created_at: now,
        });

        Ok(created)
    }
}
