use axum::{extract::State, Json};
use serde::Serialize;
use wbid_common::db::species::count_species;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AboutResponse {
    /// Rows currently in the species catalog
    pub total_species: i64,
    /// Classes the loaded model can recognize
    pub trained_species: usize,
}

/// GET /about
pub async fn about(State(state): State<AppState>) -> ApiResult<Json<AboutResponse>> {
    let total_species = count_species(&state.db).await?;
    Ok(Json(AboutResponse {
        total_species,
        trained_species: state.classifier.class_count(),
    }))
}
