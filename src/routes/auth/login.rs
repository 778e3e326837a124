use axum::{
    extract::{Json, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use serde_json::json;
use time::{Duration, OffsetDateTime};
use tracing::{debug, error};

use crate::models::user::PublicUser;
use crate::responses::JsonResponse;
use crate::routes::auth::claims::Claims;
use crate::routes::auth::session::{AuthSession, AUTH_COOKIE};
use crate::state::AppState;
use crate::utils::{jwt::create_jwt, password::verify_password};

/// One message for every credential failure: unknown account, passwordless
/// account and wrong password must be indistinguishable to the caller.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Deserialize, Serialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Response {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return JsonResponse::bad_request("Email and password are required").into_response();
    }

    let user = match state.users.find_user_by_email(email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            debug!(email, "login rejected: no account for email");
            return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
        }
        Err(err) => {
            error!(?err, "failed to load user during login");
            return JsonResponse::server_error("Sign-in is unavailable right now").into_response();
        }
    };

    let Some(hash) = user.password_hash.as_deref() else {
        debug!(user_id = user.id, "login rejected: account has no password hash");
        return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
    };

    match verify_password(&payload.password, hash) {
        Ok(true) => {}
        Ok(false) => {
            debug!(user_id = user.id, "login rejected: password mismatch");
            return JsonResponse::unauthorized(INVALID_CREDENTIALS).into_response();
        }
        Err(err) => {
            error!(?err, user_id = user.id, "password verification error");
            return JsonResponse::server_error("Sign-in is unavailable right now").into_response();
        }
    }

    let expires_in = Duration::days(state.config.session_ttl_days);
    let claims = Claims {
        id: user.id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: (OffsetDateTime::now_utc() + expires_in).unix_timestamp() as usize,
        iss: String::new(),
        aud: String::new(),
    };

    let token = match create_jwt(
        claims,
        &state.jwt_keys,
        &state.config.jwt_issuer,
        &state.config.jwt_audience,
    ) {
        Ok(token) => token,
        Err(err) => {
            error!(?err, user_id = user.id, "failed to mint session token");
            return JsonResponse::server_error("Sign-in is unavailable right now").into_response();
        }
    };

    let cookie = Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .secure(state.config.auth_cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(expires_in)
        .build();

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            error!(?err, "failed to encode session cookie");
            return JsonResponse::server_error("Sign-in is unavailable right now").into_response();
        }
    }

    let public = PublicUser {
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
        avatar_url: user.avatar_url,
    };

    (
        StatusCode::OK,
        headers,
        Json(json!({
            "success": true,
            "user": public,
        })),
    )
        .into_response()
}

pub async fn handle_me(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Response {
    let user_id = match claims.id.parse::<i32>() {
        Ok(id) => id,
        Err(_) => return JsonResponse::unauthorized("Invalid user session").into_response(),
    };

    match state.users.find_public_user_by_id(user_id).await {
        Ok(Some(user)) => Json(json!({
            "success": true,
            "user": user,
        }))
        .into_response(),
        Ok(None) => JsonResponse::unauthorized("User not found").into_response(),
        Err(err) => {
            error!(?err, user_id, "failed to load user for session");
            JsonResponse::server_error("Failed to load user").into_response()
        }
    }
}
