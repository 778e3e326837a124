use serde::{Deserialize, Serialize};
use sqlx::{prelude::Type, FromRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    /// Accounts provisioned through non-credential flows carry no hash.
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub role: UserRole,
    pub avatar_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

/// Identity projection embedded in issue payloads. Deliberately excludes
/// the password hash and role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRef {
    pub id: i32,
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PublicUser {
    pub id: i32,
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub avatar_url: Option<String>,
}

impl User {
    pub fn as_ref_projection(&self) -> UserRef {
        UserRef {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}
