//! Photo identification workflow
//!
//! Classify the upload off the async runtime under a deadline, store it,
//! check catalog membership, triage, and queue low-confidence observations
//! for review. Uploads that fail to decode or classify are never written.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};
use wbid_ai::{decode_image, ClassifierError, Prediction};
use wbid_common::db::pending::insert_pending;
use wbid_common::db::species::species_exists;
use wbid_common::names::normalize_scientific_name;

use crate::error::{ApiError, ApiResult};
use crate::triage::{self, TriageStatus};
use crate::upload;
use crate::AppState;

/// Multipart field carrying the photo
pub const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub struct IdentifyResponse {
    pub species: String,
    pub status: TriageStatus,
    pub message: &'static str,
    pub image_path: String,
}

struct ImageUpload {
    file_name: String,
    bytes: Bytes,
}

/// Pull the `image` field out of the form; `None` when absent or empty
async fn read_image_field(multipart: &mut Multipart) -> ApiResult<Option<ImageUpload>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        if file_name.is_empty() || bytes.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ImageUpload { file_name, bytes }));
    }
    Ok(None)
}

/// Decode and classify on the blocking pool, bounded by the configured timeout
async fn classify(state: &AppState, bytes: Bytes) -> ApiResult<Prediction> {
    let classifier = Arc::clone(&state.classifier);
    let task = tokio::task::spawn_blocking(move || {
        let image = decode_image(&bytes)?;
        classifier.classify(&image)
    });

    match tokio::time::timeout(state.settings.classify_timeout, task).await {
        Ok(Ok(Ok(prediction))) => Ok(prediction),
        Ok(Ok(Err(ClassifierError::Decode(reason)))) => {
            warn!("Uploaded file is not a readable image: {}", reason);
            Err(ApiError::BadRequest("uploaded file is not a readable image".to_string()))
        }
        Ok(Ok(Err(e))) => {
            error!("Classification failed: {}", e);
            Err(ApiError::ProcessingFailed)
        }
        Ok(Err(e)) => {
            error!("Classification task panicked: {}", e);
            Err(ApiError::ProcessingFailed)
        }
        Err(_) => {
            warn!(
                timeout_ms = state.settings.classify_timeout.as_millis() as u64,
                "Classification timed out"
            );
            Err(ApiError::ProcessingFailed)
        }
    }
}

/// POST /identify
///
/// A missing or empty `image` field redirects back to the upload form.
pub async fn identify(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Response> {
    let Some(upload) = read_image_field(&mut multipart).await? else {
        return Ok(Redirect::to("/identify").into_response());
    };

    // Classify before storing: rejected uploads never reach the upload directory
    let prediction = classify(&state, upload.bytes.clone()).await?;

    let stored = upload::store(&state.upload_dir, &upload.file_name, &upload.bytes)
        .await
        .map_err(|e| {
            error!("Failed to store upload: {}", e);
            ApiError::ProcessingFailed
        })?;

    let scientific = normalize_scientific_name(&prediction.scientific);
    let in_database = species_exists(&state.db, &scientific).await.map_err(|e| {
        error!("Catalog lookup failed: {}", e);
        ApiError::ProcessingFailed
    })?;

    let decision = triage::decide(prediction.confidence, in_database);

    if decision.requires_review() {
        insert_pending(
            &state.db,
            &prediction.species,
            prediction.confidence,
            &stored.public_path,
        )
        .await
        .map_err(|e| {
            error!("Failed to queue observation: {}", e);
            ApiError::ProcessingFailed
        })?;
    }

    info!(
        species = %prediction.species,
        confidence = prediction.confidence,
        in_database,
        status = %decision.status,
        "Identified upload"
    );

    Ok(Json(IdentifyResponse {
        species: prediction.species,
        status: decision.status,
        message: decision.message,
        image_path: stored.public_path,
    })
    .into_response())
}
