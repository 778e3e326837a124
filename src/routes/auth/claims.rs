use serde::{Deserialize, Serialize};

use crate::models::user::UserRole;

/// Identity carried by the session token. Re-derived from the cookie on
/// every request; role changes take effect on the next token issuance.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Claims {
    pub id: String, // user ID (integer, stringified)
    pub email: String,
    pub name: Option<String>,
    pub role: UserRole,
    pub exp: usize, // expiration (as UNIX timestamp)
    pub iss: String,
    pub aud: String,
}
