use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::responses::JsonResponse;
use crate::routes::auth::claims::Claims;
use crate::state::AppState;
use crate::utils::jwt::decode_jwt;

pub const AUTH_COOKIE: &str = "auth_token";

/// Explicit per-request identity context. Extracted before any handler logic
/// runs; a missing or invalid token rejects the request without touching
/// storage.
#[derive(Debug, PartialEq)]
pub struct AuthSession(pub Claims);

impl FromRequestParts<AppState> for AuthSession {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(AUTH_COOKIE)
            .ok_or_else(|| JsonResponse::unauthorized("Authentication required").into_response())?;

        let data = decode_jwt(
            token.value(),
            &state.jwt_keys,
            &state.config.jwt_issuer,
            &state.config.jwt_audience,
        )
        .map_err(|_| JsonResponse::unauthorized("Invalid or expired session").into_response())?;

        Ok(AuthSession(data.claims))
    }
}
