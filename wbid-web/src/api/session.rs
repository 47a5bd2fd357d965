//! Admin session gate
//!
//! A signed token (`wbid_common::auth`) travels in an HttpOnly cookie. The
//! middleware verifies signature and expiry on every protected request and
//! confirms the admin row still exists with the token's session generation.
//! Logout bumps the generation, so a copied cookie dies with the session.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, error};
use wbid_common::auth::{now_ms, verify_session_token};
use wbid_common::db::admins::get_admin;

use crate::AppState;

pub const SESSION_COOKIE: &str = "wbid_session";
pub const LOGIN_PATH: &str = "/admin/login";

/// Authenticated admin, inserted as a request extension by [`require_admin`]
#[derive(Debug, Clone, Copy)]
pub struct AdminSession {
    pub admin_id: i64,
}

/// Find the session token among the request cookies
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a fresh token
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value that makes the browser drop the session
pub fn cleared_session_cookie() -> String {
    format!("{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0", SESSION_COOKIE)
}

async fn authenticate(state: &AppState, headers: &HeaderMap) -> Option<AdminSession> {
    let token = session_token(headers)?;

    let claims = match verify_session_token(token, &state.session_secret, now_ms()) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Rejected admin session: {}", e);
            return None;
        }
    };

    match get_admin(&state.db, claims.admin_id).await {
        Ok(Some(admin)) if admin.session_generation == claims.generation => Some(AdminSession {
            admin_id: claims.admin_id,
        }),
        Ok(Some(_)) => {
            debug!(admin_id = claims.admin_id, "Session was revoked by logout");
            None
        }
        Ok(None) => {
            debug!(admin_id = claims.admin_id, "Session refers to a deleted admin");
            None
        }
        Err(e) => {
            error!("Admin lookup failed: {}", e);
            None
        }
    }
}

/// Session middleware for admin routes
///
/// Anonymous or expired sessions are redirected to the login form.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(&state, request.headers()).await {
        Some(session) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        None => Redirect::to(LOGIN_PATH).into_response(),
    }
}
