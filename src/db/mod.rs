pub mod issue_repository;
#[cfg(test)]
pub mod mock_db;
pub mod postgres_issue_repository;
pub mod postgres_user_repository;
pub mod user_repository;
