use async_trait::async_trait;

use crate::models::user::{PublicUser, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_public_user_by_id(&self, user_id: i32)
        -> Result<Option<PublicUser>, sqlx::Error>;
    async fn user_exists(&self, user_id: i32) -> Result<bool, sqlx::Error>;
}
