mod config;
mod db;
mod models;
mod query;
mod responses;
mod routes;
mod state;
mod utils;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use axum::{
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::postgres_issue_repository::PostgresIssueRepository;
use crate::db::postgres_user_repository::PostgresUserRepository;
use crate::db::{issue_repository::IssueRepository, user_repository::UserRepository};
use crate::responses::JsonResponse;
use crate::routes::auth::{handle_login, handle_logout, handle_me};
use crate::routes::issues::{create_issue, list_issues};
use crate::state::AppState;
use crate::utils::jwt::JwtKeys;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(Config::from_env()?);
    let jwt_keys = Arc::new(JwtKeys::from_env()?);

    // Stricter limiter for /api/auth/* to slow down credential stuffing.
    let rate_limit_auth_s: u64 = std::env::var("RATE_LIMITER_AUTH_SECONDS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let rate_limit_auth_burst: u32 = std::env::var("RATE_LIMITER_AUTH_BURST")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(10);
    let auth_governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(rate_limit_auth_s)
            .burst_size(rate_limit_auth_burst)
            .use_headers()
            .error_handler(|_err| {
                JsonResponse::too_many_requests(
                    "Too many requests. Please wait a moment and try again.",
                )
                .into_response()
            })
            .finish()
            .context("invalid rate limiter configuration")?,
    );

    // Background task to cleanup old rate limiter entries
    let governor_limiter = auth_governor_conf.limiter().clone();
    std::thread::spawn(move || {
        let interval = std::time::Duration::from_secs(60);
        loop {
            std::thread::sleep(interval);
            governor_limiter.retain_recent();
        }
    });

    let pg_pool = establish_connection(&config.database_url).await?;
    let user_repo = Arc::new(PostgresUserRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn UserRepository>;
    let issue_repo = Arc::new(PostgresIssueRepository {
        pool: pg_pool.clone(),
    }) as Arc<dyn IssueRepository>;

    let state = AppState {
        users: user_repo,
        issues: issue_repo,
        config: config.clone(),
        jwt_keys,
    };

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_origin
                .parse::<HeaderValue>()
                .context("FRONTEND_ORIGIN is not a valid origin")?,
        )
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true);

    let auth_routes = Router::new()
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/me", get(handle_me))
        .layer(GovernorLayer {
            config: auth_governor_conf,
        });

    let issue_routes = Router::new().route("/", get(list_issues).post(create_issue));

    let app = Router::new()
        .route("/", get(root))
        .nest("/api/auth", auth_routes)
        .nest("/api/issues", issue_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));

    let listener = TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, make_service).await?;

    Ok(())
}

/// A simple root route.
async fn root() -> Response {
    JsonResponse::success("Hello, Bugtrack!").into_response()
}

/// Establish a connection to the database and verify it.
async fn establish_connection(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPool::connect(database_url)
        .await
        .context("failed to connect to the database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("failed to verify database connection")?;

    info!("Successfully connected to the database");
    Ok(pool)
}
