use std::env;

use anyhow::Context;

pub const DEFAULT_SESSION_TTL_DAYS: i64 = 7;

pub struct Config {
    pub database_url: String,
    pub frontend_origin: String,
    pub auth_cookie_secure: bool,
    pub session_ttl_days: i64,
    pub jwt_issuer: String,
    pub jwt_audience: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok(); // Load .env file

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let frontend_origin =
            env::var("FRONTEND_ORIGIN").context("FRONTEND_ORIGIN must be set")?;

        let auth_cookie_secure = env::var("AUTH_COOKIE_SECURE")
            .ok()
            .map(|v| v != "false")
            .unwrap_or(true);

        let session_ttl_days = env::var("SESSION_TTL_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_DAYS);

        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "bugtrack".to_string());
        let jwt_audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| "bugtrack-web".to_string());

        Ok(Config {
            database_url,
            frontend_origin,
            auth_cookie_secure,
            session_ttl_days,
            jwt_issuer,
            jwt_audience,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            database_url: String::new(),
            frontend_origin: "http://localhost".into(),
            auth_cookie_secure: false,
            session_ttl_days: DEFAULT_SESSION_TTL_DAYS,
            jwt_issuer: "test-issuer".into(),
            jwt_audience: "test-audience".into(),
        }
    }
}
