//! Triage decision engine
//!
//! Maps a classifier confidence (percentage) and catalog membership to one
//! of three outcomes. Precedence is evaluated top to bottom:
//!
//! 1. in catalog and confidence >= 32: confirmed, nothing stored
//! 2. confidence >= 22: likely, nothing stored (membership is not consulted)
//! 3. otherwise: potential new, queued for admin review
//!
//! The user message depends on the confidence band only. The percentage
//! itself never appears in it.

use serde::Serialize;

pub const CONFIRMED_THRESHOLD: f64 = 32.0;
pub const LIKELY_THRESHOLD: f64 = 22.0;

pub const CONFIRMED_MESSAGE: &str = "Confirmed identification – this species has been previously documented as a migratory bird of the Chatlam Wetland.";
pub const PROBABLE_MESSAGE: &str = "Probable identification – this bird closely resembles a known migratory species and is currently under expert verification.";
pub const POSSIBLY_NEW_MESSAGE: &str = "Based on our analysis, this observation may represent a new or rare migratory bird not included among the 103 species currently recorded from the Chatlam Wetland.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriageStatus {
    #[serde(rename = "Confirmed Migratory Bird")]
    Confirmed,
    #[serde(rename = "Likely Migratory Species (Under Expert Verification)")]
    Likely,
    #[serde(rename = "Potential New / Rare Visitor")]
    PotentialNew,
}

impl TriageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageStatus::Confirmed => "Confirmed Migratory Bird",
            TriageStatus::Likely => "Likely Migratory Species (Under Expert Verification)",
            TriageStatus::PotentialNew => "Potential New / Rare Visitor",
        }
    }
}

impl std::fmt::Display for TriageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriageDecision {
    pub status: TriageStatus,
    pub message: &'static str,
}

impl TriageDecision {
    /// Whether the observation goes to the admin review queue
    pub fn requires_review(&self) -> bool {
        self.status == TriageStatus::PotentialNew
    }
}

/// User-facing message for a confidence band
pub fn message_for(confidence: f64) -> &'static str {
    if confidence >= CONFIRMED_THRESHOLD {
        CONFIRMED_MESSAGE
    } else if confidence >= LIKELY_THRESHOLD {
        PROBABLE_MESSAGE
    } else {
        POSSIBLY_NEW_MESSAGE
    }
}

pub fn decide(confidence: f64, in_database: bool) -> TriageDecision {
    let status = if in_database && confidence >= CONFIRMED_THRESHOLD {
        TriageStatus::Confirmed
    } else if confidence >= LIKELY_THRESHOLD {
        TriageStatus::Likely
    } else {
        TriageStatus::PotentialNew
    };

    TriageDecision {
        status,
        message: message_for(confidence),
    }
}
