//! Single-password admin login backed by a session cookie.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::{error::ApiError, extract::ApiJson, AppState};
use crate::storage::LedgerStorage;

pub const AUTH_COOKIE: &str = "authenticated";
const SESSION_DAYS: i64 = 7;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    password: Option<String>,
}

pub fn is_authenticated(jar: &CookieJar) -> bool {
    jar.get(AUTH_COOKIE)
        .is_some_and(|cookie| cookie.value() == "true")
}

/// Rejects requests that do not carry the session cookie.
pub async fn require_auth(jar: CookieJar, request: Request, next: Next) -> Result<Response, ApiError> {
    if !is_authenticated(&jar) {
        return Err(ApiError::Unauthorized);
    }
    Ok(next.run(request).await)
}

pub async fn login<S: LedgerStorage>(
    State(state): State<AppState<S>>,
    jar: CookieJar,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let password = body
        .password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Password required".to_string()))?;

    if password != state.auth.admin_password {
        warn!("rejected login attempt");
        return Err(ApiError::InvalidPassword);
    }

    let cookie = Cookie::build((AUTH_COOKIE, "true"))
        .http_only(true)
        .secure(state.auth.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .path("/");
    info!("admin logged in");
    Ok((jar.add(cookie), Json(json!({ "success": true }))))
}

pub async fn check(jar: CookieJar) -> Json<Value> {
    Json(json!({ "authenticated": is_authenticated(&jar) }))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(json!({ "success": true })))
}
