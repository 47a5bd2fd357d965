//! wbid-web library - wetland bird identification service
//!
//! Public visitors upload a photo and receive a triaged identification;
//! administrators review low-confidence observations and curate the species
//! catalog.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use sqlx::SqlitePool;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use wbid_ai::SpeciesClassifier;
use wbid_common::config::TomlConfig;

pub mod api;
pub mod error;
pub mod triage;
pub mod upload;

/// Request-handling limits taken from bootstrap configuration
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    pub classify_timeout: Duration,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl ServiceSettings {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            classify_timeout: Duration::from_millis(config.classify_timeout_ms),
            session_ttl: Duration::from_secs(config.session_ttl_seconds),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Loaded once at startup; tests inject a fixed implementation
    pub classifier: Arc<dyn SpeciesClassifier>,
    /// Key for signing admin session tokens
    pub session_secret: Arc<str>,
    /// Directory uploaded photos are written to and served from
    pub upload_dir: PathBuf,
    pub settings: ServiceSettings,
    pub startup_time: Instant,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        classifier: Arc<dyn SpeciesClassifier>,
        session_secret: String,
        upload_dir: PathBuf,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            db,
            classifier,
            session_secret: Arc::from(session_secret),
            upload_dir,
            settings,
            startup_time: Instant::now(),
        }
    }
}

/// Build application router
///
/// Admin routes sit behind the session gate, which redirects anonymous
/// visitors to the login form. Everything else is public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/admin/logout", get(api::admin::logout))
        .route("/admin/review", get(api::admin::review))
        .route("/admin/approve/:id", post(api::admin::approve))
        .route("/admin/reject/:id", post(api::admin::reject))
        .route("/admin/species", get(api::admin::species_list))
        .route(
            "/admin/species/edit/:id",
            get(api::admin::edit_species_form).post(api::admin::edit_species),
        )
        .route("/admin/species/delete/:id", post(api::admin::delete_species))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::session::require_admin,
        ));

    let public = Router::new()
        .route("/", get(api::ui::serve_upload_page))
        .route(
            "/identify",
            get(api::ui::serve_upload_page).post(api::identify::identify),
        )
        .route("/species", get(api::species::list_species))
        .route("/species/:id", get(api::species::species_detail))
        .route("/about", get(api::about::about))
        .route(
            "/admin/login",
            get(api::admin::login_page).post(api::admin::login),
        )
        .merge(api::health_routes());

    let max_upload = state.settings.max_upload_bytes;
    let uploads = ServeDir::new(&state.upload_dir);

    Router::new()
        .merge(protected)
        .merge(public)
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
