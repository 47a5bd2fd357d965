//! Public species catalog

use axum::{
    extract::{Path, Query, State},
    Json,
};
use wbid_common::db::models::{SpeciesFilter, SpeciesRecord};
use wbid_common::db::species;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /species?status=&season=&q=
///
/// `status` matches as a substring, `season` exactly, `q` as a substring of
/// either name. Empty parameters are ignored.
pub async fn list_species(
    State(state): State<AppState>,
    Query(filter): Query<SpeciesFilter>,
) -> ApiResult<Json<Vec<SpeciesRecord>>> {
    let records = species::list_species(&state.db, &filter).await?;
    Ok(Json(records))
}

/// GET /species/:id
pub async fn species_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SpeciesRecord>> {
    species::get_species(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Species not found".to_string()))
}
