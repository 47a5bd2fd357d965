//! Species catalog queries

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::db::models::{SpeciesFilter, SpeciesInput, SpeciesRecord};
use crate::names::normalize_scientific_name;
use crate::Result;

const SPECIES_COLUMNS: &str = "id, common_name, scientific_name, status, season, image";

/// List catalog entries matching every provided filter
///
/// - `status`: substring (`LIKE %status%`)
/// - `season`: exact match
/// - `q`: substring of common name OR scientific name
pub async fn list_species(db: &SqlitePool, filter: &SpeciesFilter) -> Result<Vec<SpeciesRecord>> {
    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {} FROM species WHERE 1=1", SPECIES_COLUMNS));

    if let Some(status) = filter.status() {
        qb.push(" AND status LIKE ").push_bind(format!("%{}%", status));
    }

    if let Some(season) = filter.season() {
        qb.push(" AND season = ").push_bind(season.to_string());
    }

    if let Some(q) = filter.query() {
        let pattern = format!("%{}%", q);
        qb.push(" AND (common_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR scientific_name LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    qb.push(" ORDER BY id");

    let rows = qb
        .build_query_as::<SpeciesRecord>()
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Full catalog ordered by common name (admin listing)
pub async fn list_species_by_common_name(db: &SqlitePool) -> Result<Vec<SpeciesRecord>> {
    let rows = sqlx::query_as::<_, SpeciesRecord>(&format!(
        "SELECT {} FROM species ORDER BY common_name",
        SPECIES_COLUMNS
    ))
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Fetch a single entry; `None` when the id does not exist
pub async fn get_species(db: &SqlitePool, id: i64) -> Result<Option<SpeciesRecord>> {
    let row = sqlx::query_as::<_, SpeciesRecord>(&format!(
        "SELECT {} FROM species WHERE id = ?",
        SPECIES_COLUMNS
    ))
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

/// Catalog membership by scientific name
///
/// Both the argument and the stored column are canonicalized the same way
/// (lowercase, underscores to spaces, trimmed) before an exact comparison.
pub async fn species_exists(db: &SqlitePool, scientific_name: &str) -> Result<bool> {
    let normalized = normalize_scientific_name(scientific_name);
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM species WHERE LOWER(TRIM(REPLACE(scientific_name, '_', ' '))) = ? LIMIT 1",
    )
    .bind(normalized)
    .fetch_optional(db)
    .await?;
    Ok(found.is_some())
}

/// Insert a catalog entry, returning its id
pub async fn insert_species(db: &SqlitePool, input: &SpeciesInput) -> Result<i64> {
    input.validate()?;
    let result = sqlx::query(
        "INSERT INTO species (common_name, scientific_name, status, season, image)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(input.common_name.trim())
    .bind(input.scientific_name.trim())
    .bind(&input.status)
    .bind(&input.season)
    .bind(&input.image)
    .execute(db)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Overwrite every field of an entry; `false` when the id does not exist
pub async fn update_species(db: &SqlitePool, id: i64, input: &SpeciesInput) -> Result<bool> {
    input.validate()?;
    let result = sqlx::query(
        "UPDATE species
         SET common_name = ?, scientific_name = ?, status = ?, season = ?, image = ?
         WHERE id = ?",
    )
    .bind(input.common_name.trim())
    .bind(input.scientific_name.trim())
    .bind(&input.status)
    .bind(&input.season)
    .bind(&input.image)
    .bind(id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an entry; `false` when nothing was deleted
pub async fn delete_species(db: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM species WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Number of catalog entries
pub async fn count_species(db: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM species")
        .fetch_one(db)
        .await?;
    Ok(count)
}
