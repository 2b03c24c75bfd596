use serde::{Deserialize, Serialize};

/// Which numeric scale a score value lives on. Band thresholds differ per
/// scale and the scale is always chosen by the caller, never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreScale {
    /// 0–10 driving score shown to users.
    Ten,
    /// 0–100 percentage derived from the provider's 0–1 indicator.
    Hundred,
}

/// Discrete quality band for a driving score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    NeedsImprovement,
    Poor,
}

impl ScoreBand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::Fair => "fair",
            Self::NeedsImprovement => "needs_improvement",
            Self::Poor => "poor",
        }
    }
}

impl std::fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a telematics score lookup produced for one driver.
///
/// Distinguishes "the provider scored this driver" from "the provider has
/// no score" from "the lookup itself failed" — the outward numeric score
/// is 0.0 for the last two, but consumers can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreOutcome {
    /// Provider returned a 0–1 driving indicator.
    Scored { indicator: f64 },
    /// Driver known to the provider but no indicator for the window.
    Unscored,
    /// The collaborator call failed for this driver.
    Error,
}

impl ScoreOutcome {
    /// The raw 0–1 indicator, treating unscored/error as zero.
    pub fn indicator_or_zero(&self) -> f64 {
        match self {
            Self::Scored { indicator } => *indicator,
            Self::Unscored | Self::Error => 0.0,
        }
    }
}

/// A derived score record. Never stored; recomputed on every fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Email when available, display name otherwise.
    pub subject: String,
    /// Provider-native 0–1 driving indicator.
    pub raw_indicator: f64,
    pub normalized_0_100: f64,
    pub normalized_0_10: f64,
    pub classification: ScoreBand,
}
