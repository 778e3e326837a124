pub mod issue;
pub mod issue_history;
pub mod user;
