//! Admin review queue (`pending_observations`)
//!
//! Rows are created by the identify workflow and leave the queue in exactly
//! two ways: [`approve_pending`] moves them into the catalog, and
//! [`reject_pending`] deletes them.

use sqlx::SqlitePool;
use tracing::info;

use crate::db::models::{ApprovalInput, PendingObservation};
use crate::Result;

const PENDING_COLUMNS: &str = "id, predicted_name, confidence, image_path, created_at";

/// Queue a prediction for review, returning the new row id
pub async fn insert_pending(
    db: &SqlitePool,
    predicted_name: &str,
    confidence: f64,
    image_path: &str,
) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO pending_observations (predicted_name, confidence, image_path)
         VALUES (?, ?, ?)",
    )
    .bind(predicted_name)
    .bind(confidence)
    .bind(image_path)
    .execute(db)
    .await?;

    let id = result.last_insert_rowid();
    info!(
        pending_id = id,
        predicted_name, confidence, "Queued observation for review"
    );
    Ok(id)
}

/// All pending observations, most recent first
pub async fn list_pending(db: &SqlitePool) -> Result<Vec<PendingObservation>> {
    let rows = sqlx::query_as::<_, PendingObservation>(&format!(
        "SELECT {} FROM pending_observations ORDER BY id DESC",
        PENDING_COLUMNS
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Fetch one pending observation
pub async fn get_pending(db: &SqlitePool, id: i64) -> Result<Option<PendingObservation>> {
    let row = sqlx::query_as::<_, PendingObservation>(&format!(
        "SELECT {} FROM pending_observations WHERE id = ?",
        PENDING_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Move a pending observation into the catalog
///
/// Inserts a species row built from the admin-supplied metadata and the
/// observation's stored image path, then deletes the pending row. Both
/// statements run in one transaction. The new species row gets its own id.
///
/// Returns the new species id, or `None` (and writes nothing) when the
/// pending id does not exist.
pub async fn approve_pending(
    db: &SqlitePool,
    pending_id: i64,
    input: &ApprovalInput,
) -> Result<Option<i64>> {
    input.validate()?;

    let mut tx = db.begin().await?;

    let image_path: Option<String> =
        sqlx::query_scalar("SELECT image_path FROM pending_observations WHERE id = ?")
            .bind(pending_id)
            .fetch_optional(&mut *tx)
            .await?;

    let Some(image_path) = image_path else {
        tx.rollback().await?;
        return Ok(None);
    };

    let species_id = sqlx::query(
        "INSERT INTO species (common_name, scientific_name, status, season, image)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(input.common_name.trim())
    .bind(input.scientific_name.trim())
    .bind(&input.status)
    .bind(&input.season)
    .bind(&image_path)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    sqlx::query("DELETE FROM pending_observations WHERE id = ?")
        .bind(pending_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    info!(
        pending_id,
        species_id,
        common_name = %input.common_name,
        "Approved observation into catalog"
    );

    Ok(Some(species_id))
}

/// Delete a pending observation; `false` when the id did not exist
pub async fn reject_pending(db: &SqlitePool, pending_id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM pending_observations WHERE id = ?")
        .bind(pending_id)
        .execute(db)
        .await?;

    let removed = result.rows_affected() > 0;
    if removed {
        info!(pending_id, "Rejected observation");
    }
    Ok(removed)
}

/// Number of observations awaiting review
pub async fn count_pending(db: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pending_observations")
        .fetch_one(db)
        .await?;
    Ok(count)
}
