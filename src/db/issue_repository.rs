use async_trait::async_trait;

use crate::models::issue::{IssueWithRelations, NewIssue};
use crate::query::IssueQuery;

/// One page of issues plus the total match count. The count and the page
/// fetch are separate statements; they may drift by a few rows under
/// concurrent writes, which is accepted.
#[derive(Debug)]
pub struct IssuePage {
    pub issues: Vec<IssueWithRelations>,
    pub total: i64,
}

#[async_trait]
pub trait IssueRepository: Send + Sync {
    async fn list_issues(&self, query: &IssueQuery) -> Result<IssuePage, sqlx::Error>;

    /// Creates the issue and its initial OPEN->OPEN history row in a single
    /// transaction. Either both rows persist or neither does.
    async fn create_issue(
        &self,
        reporter_id: i32,
        issue: NewIssue,
    ) -> Result<IssueWithRelations, sqlx::Error>;
}
