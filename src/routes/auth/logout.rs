use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;
use tracing::error;

use crate::responses::JsonResponse;
use crate::routes::auth::session::AUTH_COOKIE;

/// Expires the session cookie. The token itself stays valid until its exp
/// claim; there is no server-side revocation.
pub async fn handle_logout() -> Response {
    let cookie = Cookie::build((AUTH_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(0))
        .build();

    let mut headers = HeaderMap::new();
    match HeaderValue::from_str(&cookie.to_string()) {
        Ok(value) => {
            headers.insert(header::SET_COOKIE, value);
        }
        Err(err) => {
            error!(?err, "failed to encode logout cookie");
            return JsonResponse::server_error("Logout failed").into_response();
        }
    }

    (headers, JsonResponse::success("Signed out")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;

    use super::handle_logout;

    #[tokio::test]
    async fn test_logout_expires_cookie() {
        let res = handle_logout().await.into_response();
        assert_eq!(res.status(), StatusCode::OK);

        let set_cookie = res
            .headers()
            .get(header::SET_COOKIE)
            .expect("logout should clear the cookie")
            .to_str()
            .unwrap();
        assert!(set_cookie.starts_with("auth_token="));
        assert!(set_cookie.contains("Max-Age=0"));
    }
}
