use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::score::{ScoreBand, ScoreOutcome};

/// A driver record from the telematics provider's roster report.
///
/// `email` is the only reliable cross-source key and may be empty —
/// matching code must never treat an empty email as a valid key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverRecord {
    /// Display name as the provider renders it (may carry an area-code
    /// suffix like "John Smith (NW10)").
    #[serde(default)]
    pub display_name: String,
    /// Contact email, possibly absent or blank.
    #[serde(default)]
    pub email: String,
    /// Remaining provider fields, passed through untyped.
    #[serde(flatten)]
    pub raw_fields: HashMap<String, Value>,
}

/// An engineer record from the CRM roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerRecord {
    pub name: String,
    /// Email sourced from the related contact sub-record; engineers
    /// without one are excluded from cross-source matching.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trade_group: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// One row of the engineer leaderboard produced by batch reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerScore {
    /// 1-based rank after sorting by (score desc, name asc).
    pub rank: usize,
    pub name: String,
    pub email: String,
    pub van_number: String,
    pub trade_group: String,
    /// Driving score on the 0–10 scale; 0.0 when unscored.
    pub driving_score: f64,
    /// Band classified on the 0–100 scale.
    pub score_class: ScoreBand,
    /// What the telematics lookup actually produced for this engineer.
    pub outcome: ScoreOutcome,
}

/// A decoded driver-roster row handed in by the caller (file decoding
/// stays outside this system).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub van_number: Option<String>,
}

/// A cleaned, ranked roster entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterDriver {
    pub rank: usize,
    pub name: String,
    pub email: String,
    /// Score on the 0–10 scale.
    pub score: f64,
    pub van_number: String,
    pub trade_group: String,
    pub score_class: ScoreBand,
}

/// Summary statistics over a cleaned roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterStats {
    pub total_drivers: usize,
    pub drivers_with_scores: usize,
    pub average_score: f64,
    pub highest_score: f64,
    pub lowest_score: f64,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub needs_improvement: usize,
    pub poor: usize,
}
