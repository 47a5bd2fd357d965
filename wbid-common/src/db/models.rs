//! Database models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpeciesRecord {
    pub id: i64,
    pub common_name: String,
    pub scientific_name: String,
    pub status: String,
    pub season: String,
    /// Relative image URL (e.g. `uploads/heron.jpg`)
    pub image: Option<String>,
}

/// A low-confidence prediction waiting for admin review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PendingObservation {
    pub id: i64,
    pub predicted_name: String,
    /// Percentage in [0, 100]
    pub confidence: f64,
    pub image_path: String,
    pub created_at: NaiveDateTime,
}

/// Admin account as stored (never serialized to clients)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Admin {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub password_salt: String,
    /// Bumped on logout; tokens carrying an older value are refused
    pub session_generation: i64,
}

/// Catalog metadata supplied by an admin when approving an observation
///
/// The image is not part of the form: approval reuses the observation's
/// stored image path.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalInput {
    pub common_name: String,
    pub scientific_name: String,
    pub status: String,
    pub season: String,
}

/// Full catalog row contents for inserts and admin edits
#[derive(Debug, Clone, Deserialize)]
pub struct SpeciesInput {
    pub common_name: String,
    pub scientific_name: String,
    pub status: String,
    pub season: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Listing filters; empty strings count as absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesFilter {
    /// Substring match on `status`
    #[serde(default)]
    pub status: Option<String>,
    /// Exact match on `season`
    #[serde(default)]
    pub season: Option<String>,
    /// Substring match on common or scientific name
    #[serde(default)]
    pub q: Option<String>,
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl ApprovalInput {
    pub fn validate(&self) -> Result<()> {
        require("common_name", &self.common_name)?;
        require("scientific_name", &self.scientific_name)
    }
}

impl SpeciesInput {
    pub fn validate(&self) -> Result<()> {
        require("common_name", &self.common_name)?;
        require("scientific_name", &self.scientific_name)
    }
}

impl SpeciesFilter {
    pub fn status(&self) -> Option<&str> {
        non_empty(&self.status)
    }

    pub fn season(&self) -> Option<&str> {
        non_empty(&self.season)
    }

    pub fn query(&self) -> Option<&str> {
        non_empty(&self.q)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
