use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::user::{PublicUser, User};

use super::user_repository::UserRepository;

pub struct PostgresUserRepository {
    pub pool: PgPool,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, email, name, password_hash, role, avatar_url, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_public_user_by_id(
        &self,
        user_id: i32,
    ) -> Result<Option<PublicUser>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, email, name, role, avatar_url
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn user_exists(&self, user_id: i32) -> Result<bool, sqlx::Error> {
        let found: Option<i32> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}
