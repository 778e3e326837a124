use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Json, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::models::issue::{IssueType, IssueWithRelations, NewIssue, Priority, Severity};
use crate::query::{IssueQuery, RawListParams};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthSession;
use crate::state::AppState;

const MAX_DESCRIPTION_LENGTH: usize = 4000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueListResponse {
    pub issues: Vec<IssueWithRelations>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

/// `GET /api/issues`. The session is established before the query string is
/// even parsed; an unauthenticated request performs no storage reads.
pub async fn list_issues(
    State(state): State<AppState>,
    AuthSession(_claims): AuthSession,
    params: Result<Query<RawListParams>, QueryRejection>,
) -> Response {
    let Query(raw) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return JsonResponse::bad_request(&rejection.body_text()).into_response()
        }
    };

    let query = match IssueQuery::parse(raw) {
        Ok(query) => query,
        Err(err) => return JsonResponse::bad_request(&err.to_string()).into_response(),
    };

    match state.issues.list_issues(&query).await {
        Ok(page) => Json(IssueListResponse {
            total: page.total,
            issues: page.issues,
            page: query.page,
            page_size: query.page_size,
            total_pages: query.total_pages(page.total),
        })
        .into_response(),
        Err(err) => {
            error!(?err, "failed to list issues");
            JsonResponse::server_error("Failed to load issues").into_response()
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CreateIssuePayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub steps_to_reproduce: Option<String>,
    pub priority: Option<Priority>,
    pub severity: Option<Severity>,
    #[serde(rename = "type")]
    pub issue_type: Option<IssueType>,
    pub product: Option<String>,
    pub version: Option<String>,
    pub assignee_id: Option<i32>,
}

/// `POST /api/issues`. New issues always start OPEN; any status supplied by
/// the client is ignored. The issue row and its first history row are
/// written in one transaction.
pub async fn create_issue(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
    payload: Result<Json<CreateIssuePayload>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return JsonResponse::bad_request(&rejection.body_text()).into_response()
        }
    };

    let title = payload.title.as_deref().map(str::trim).unwrap_or_default();
    let description = payload
        .description
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    let (Some(priority), Some(severity), Some(issue_type)) =
        (payload.priority, payload.severity, payload.issue_type)
    else {
        return JsonResponse::bad_request("Missing required fields").into_response();
    };
    if title.is_empty() || description.is_empty() {
        return JsonResponse::bad_request("Missing required fields").into_response();
    }
    if description.len() > MAX_DESCRIPTION_LENGTH {
        return JsonResponse::bad_request("Description is too long").into_response();
    }

    let reporter_id = match claims.id.parse::<i32>() {
        Ok(id) => id,
        Err(_) => return JsonResponse::unauthorized("Invalid user session").into_response(),
    };

    let reporter = match state.users.find_public_user_by_id(reporter_id).await {
        Ok(Some(user)) => user,
        Ok(None) => return JsonResponse::not_found("User not found").into_response(),
        Err(err) => {
            error!(?err, reporter_id, "failed to load reporter for issue creation");
            return JsonResponse::server_error("Failed to create issue").into_response();
        }
    };

    if let Some(assignee_id) = payload.assignee_id {
        match state.users.user_exists(assignee_id).await {
            Ok(true) => {}
            Ok(false) => {
                return JsonResponse::not_found("Assignee not found").into_response()
            }
            Err(err) => {
                error!(?err, assignee_id, "failed to check assignee for issue creation");
                return JsonResponse::server_error("Failed to create issue").into_response();
            }
        }
    }

    let new_issue = NewIssue {
        title: title.to_string(),
        description: description.to_string(),
        steps_to_reproduce: payload.steps_to_reproduce,
        priority,
        severity,
        issue_type,
        product: payload.product,
        version: payload.version,
        assignee_id: payload.assignee_id,
    };

    match state.issues.create_issue(reporter.id, new_issue).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => {
            error!(?err, reporter_id, "failed to persist issue");
            JsonResponse::server_error("Failed to create issue").into_response()
        }
    }
}
