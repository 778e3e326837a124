use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::models::issue::{
    Issue, IssueType, IssueWithRelations, NewIssue, Priority, Severity, Status,
};
use crate::models::issue_history::ISSUE_CREATED_NOTE;
use crate::models::user::UserRef;
use crate::query::IssueQuery;

use super::issue_repository::{IssuePage, IssueRepository};

pub struct PostgresIssueRepository {
    pub pool: PgPool,
}

/// Every recognized filter binds as a nullable parameter; a NULL bind
/// disables its predicate. The WHERE clause itself is static, so no client
/// input is ever interpolated into it.
const LIST_PREDICATE: &str = r#"
    ($1::issue_status IS NULL OR i.status = $1)
    AND ($2::issue_priority IS NULL OR i.priority = $2)
    AND ($3::issue_type IS NULL OR i.issue_type = $3)
    AND ($4::INT IS NULL OR i.assignee_id = $4)
    AND ($5::INT IS NULL OR i.reporter_id = $5)
    AND ($6::TEXT IS NULL OR i.title ILIKE $6 OR i.description ILIKE $6)
"#;

#[derive(Debug, FromRow)]
struct IssueListRow {
    id: i32,
    title: String,
    description: String,
    steps_to_reproduce: Option<String>,
    priority: Priority,
    severity: Severity,
    issue_type: IssueType,
    product: Option<String>,
    version: Option<String>,
    status: Status,
    reporter_id: i32,
    assignee_id: Option<i32>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    reporter_name: Option<String>,
    reporter_email: String,
    assignee_name: Option<String>,
    assignee_email: Option<String>,
}

impl From<IssueListRow> for IssueWithRelations {
    fn from(row: IssueListRow) -> Self {
        let reporter = UserRef {
            id: row.reporter_id,
            name: row.reporter_name,
            email: row.reporter_email,
        };
        let assignee = match (row.assignee_id, row.assignee_email) {
            (Some(id), Some(email)) => Some(UserRef {
                id,
                name: row.assignee_name,
                email,
            }),
            _ => None,
        };

        IssueWithRelations {
            issue: Issue {
                id: row.id,
                title: row.title,
                description: row.description,
                steps_to_reproduce: row.steps_to_reproduce,
                priority: row.priority,
                severity: row.severity,
                issue_type: row.issue_type,
                product: row.product,
                version: row.version,
                status: row.status,
                reporter_id: row.reporter_id,
                assignee_id: row.assignee_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            reporter,
            assignee,
        }
    }
}

/// Wildcards in the search term must match literally, not as LIKE
/// metacharacters.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl IssueRepository for PostgresIssueRepository {
    async fn list_issues(&self, query: &IssueQuery) -> Result<IssuePage, sqlx::Error> {
        let filter = &query.filter;
        let search = filter.search.as_deref().map(like_pattern);

        let count_sql = format!("SELECT COUNT(*) FROM issues i WHERE {LIST_PREDICATE}");
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.issue_type)
            .bind(filter.assignee_id)
            .bind(filter.reporter_id)
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?;

        // Sort column and direction come from the allow-listed SortField and
        // SortOrder types; id is appended as a deterministic tie-break.
        let fetch_sql = format!(
            r#"
            SELECT i.id, i.title, i.description, i.steps_to_reproduce, i.priority,
                   i.severity, i.issue_type, i.product, i.version, i.status,
                   i.reporter_id, i.assignee_id, i.created_at, i.updated_at,
                   r.name AS reporter_name, r.email AS reporter_email,
                   a.name AS assignee_name, a.email AS assignee_email
            FROM issues i
            JOIN users r ON r.id = i.reporter_id
            LEFT JOIN users a ON a.id = i.assignee_id
            WHERE {LIST_PREDICATE}
            ORDER BY i.{column} {direction}, i.id {direction}
            LIMIT $7 OFFSET $8
            "#,
            column = query.sort.column(),
            direction = query.order.sql(),
        );

        let rows: Vec<IssueListRow> = sqlx::query_as(&fetch_sql)
            .bind(filter.status)
            .bind(filter.priority)
            .bind(filter.issue_type)
            .bind(filter.assignee_id)
            .bind(filter.reporter_id)
            .bind(search.as_deref())
            .bind(query.limit())
            .bind(query.skip())
            .fetch_all(&self.pool)
            .await?;

        Ok(IssuePage {
            issues: rows.into_iter().map(IssueWithRelations::from).collect(),
            total,
        })
    }

    async fn create_issue(
        &self,
        reporter_id: i32,
        issue: NewIssue,
    ) -> Result<IssueWithRelations, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let created: Issue = sqlx::query_as(
            r#"
            INSERT INTO issues
                (title, description, steps_to_reproduce, priority, severity,
                 issue_type, product, version, status, reporter_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id, title, description, steps_to_reproduce, priority, severity,
                      issue_type, product, version, status, reporter_id, assignee_id,
                      created_at, updated_at
            "#,
        )
        .bind(&issue.title)
        .bind(&issue.description)
        .bind(issue.steps_to_reproduce.as_deref())
        .bind(issue.priority)
        .bind(issue.severity)
        .bind(issue.issue_type)
        .bind(issue.product.as_deref())
        .bind(issue.version.as_deref())
        .bind(Status::Open)
        .bind(reporter_id)
        .bind(issue.assignee_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO issue_history (issue_id, changed_by_id, from_status, to_status, note)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(created.id)
        .bind(reporter_id)
        .bind(Status::Open)
        .bind(Status::Open)
        .bind(ISSUE_CREATED_NOTE)
        .execute(&mut *tx)
        .await?;

        let reporter: UserRef = sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
            .bind(reporter_id)
            .fetch_one(&mut *tx)
            .await?;

        let assignee: Option<UserRef> = match created.assignee_id {
            Some(assignee_id) => {
                sqlx::query_as("SELECT id, name, email FROM users WHERE id = $1")
                    .bind(assignee_id)
                    .fetch_optional(&mut *tx)
                    .await?
            }
            None => None,
        };

        tx.commit().await?;

        Ok(IssueWithRelations {
            issue: created,
            reporter,
            assignee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("login"), "%login%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }
}
