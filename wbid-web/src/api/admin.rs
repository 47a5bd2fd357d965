//! Admin login, review queue and catalog curation

use axum::{
    extract::{Path, State},
    http::header,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form, Json,
};
use serde::Deserialize;
use tracing::{info, warn};
use wbid_common::auth::{issue_session_token, now_ms};
use wbid_common::db::admins::{revoke_sessions, verify_admin};
use wbid_common::db::models::{ApprovalInput, PendingObservation, SpeciesInput, SpeciesRecord};
use wbid_common::db::{pending, species};

use super::session::{cleared_session_cookie, session_cookie, AdminSession};
use super::ui::login_page as render_login_page;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

pub const REVIEW_PATH: &str = "/admin/review";
pub const ADMIN_SPECIES_PATH: &str = "/admin/species";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Species edit form
///
/// Every column is required so a partial post cannot blank out stored
/// values. An empty `image` clears the photo.
#[derive(Debug, Deserialize)]
pub struct SpeciesEditForm {
    pub common_name: String,
    pub scientific_name: String,
    pub status: String,
    pub season: String,
    pub image: String,
}

impl From<SpeciesEditForm> for SpeciesInput {
    fn from(form: SpeciesEditForm) -> Self {
        let image = form.image.trim();
        SpeciesInput {
            common_name: form.common_name,
            scientific_name: form.scientific_name,
            status: form.status,
            season: form.season,
            image: (!image.is_empty()).then(|| image.to_string()),
        }
    }
}

/// GET /admin/login
pub async fn login_page() -> Html<String> {
    render_login_page(None)
}

/// POST /admin/login
///
/// Success sets the session cookie and redirects to the review queue.
/// Failure re-renders the form and sets no cookie.
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> ApiResult<Response> {
    let Some(admin) = verify_admin(&state.db, &form.username, &form.password).await? else {
        warn!(username = %form.username.trim(), "Failed admin login");
        return Ok(render_login_page(Some(INVALID_CREDENTIALS)).into_response());
    };

    let ttl = state.settings.session_ttl;
    let expires_at_ms = now_ms().saturating_add(ttl.as_millis() as i64);
    let token = issue_session_token(
        admin.id,
        admin.session_generation,
        expires_at_ms,
        &state.session_secret,
    );

    info!(admin_id = admin.id, username = %admin.username, "Admin logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, ttl.as_secs()))],
        Redirect::to(REVIEW_PATH),
    )
        .into_response())
}

/// GET /admin/logout
///
/// Revokes every token issued to this admin, then clears the cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
) -> ApiResult<Response> {
    revoke_sessions(&state.db, session.admin_id).await?;
    info!(admin_id = session.admin_id, "Admin logged out");
    Ok((
        [(header::SET_COOKIE, cleared_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

/// GET /admin/review - pending observations, newest first
pub async fn review(State(state): State<AppState>) -> ApiResult<Json<Vec<PendingObservation>>> {
    Ok(Json(pending::list_pending(&state.db).await?))
}

/// POST /admin/approve/:id
pub async fn approve(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
    Form(input): Form<ApprovalInput>,
) -> ApiResult<Redirect> {
    match pending::approve_pending(&state.db, id, &input).await? {
        Some(species_id) => {
            info!(admin_id = session.admin_id, pending_id = id, species_id, "Observation approved");
            Ok(Redirect::to(REVIEW_PATH))
        }
        None => Err(ApiError::NotFound(format!("Observation {} not found", id))),
    }
}

/// POST /admin/reject/:id
///
/// An unknown id is not an error; the queue simply no longer has it.
pub async fn reject(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    if !pending::reject_pending(&state.db, id).await? {
        info!(admin_id = session.admin_id, pending_id = id, "Reject of unknown observation ignored");
    }
    Ok(Redirect::to(REVIEW_PATH))
}

/// GET /admin/species - catalog ordered by common name
pub async fn species_list(State(state): State<AppState>) -> ApiResult<Json<Vec<SpeciesRecord>>> {
    Ok(Json(species::list_species_by_common_name(&state.db).await?))
}

/// GET /admin/species/edit/:id
pub async fn edit_species_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SpeciesRecord>> {
    species::get_species(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Species not found".to_string()))
}

/// POST /admin/species/edit/:id
pub async fn edit_species(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
    Form(form): Form<SpeciesEditForm>,
) -> ApiResult<Redirect> {
    let input = SpeciesInput::from(form);
    if !species::update_species(&state.db, id, &input).await? {
        return Err(ApiError::NotFound("Species not found".to_string()));
    }
    info!(admin_id = session.admin_id, species_id = id, "Species updated");
    Ok(Redirect::to(ADMIN_SPECIES_PATH))
}

/// POST /admin/species/delete/:id
pub async fn delete_species(
    State(state): State<AppState>,
    Extension(session): Extension<AdminSession>,
    Path(id): Path<i64>,
) -> ApiResult<Redirect> {
    if species::delete_species(&state.db, id).await? {
        info!(admin_id = session.admin_id, species_id = id, "Species deleted");
    }
    Ok(Redirect::to(ADMIN_SPECIES_PATH))
}
