use std::sync::Arc;

use crate::config::Config;
use crate::db::{issue_repository::IssueRepository, user_repository::UserRepository};
use crate::utils::jwt::JwtKeys;

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub issues: Arc<dyn IssueRepository>,
    pub config: Arc<Config>,
    pub jwt_keys: Arc<JwtKeys>,
}
