//! Scale conversions and quality banding for driving scores.

use fp_protocol::score::{ScoreBand, ScoreRecord, ScoreScale};

/// Convert the provider's 0–1 driving indicator to a 0–100 percentage,
/// rounded to one decimal place.
pub fn to_percent_scale(indicator: f64) -> f64 {
    (indicator * 100.0 * 10.0).round() / 10.0
}

/// Normalize a score of ambiguous magnitude onto the 0–10 scale, rounded
/// to two decimals.
///
/// Source data mixes 0–10 and 0–100 values with no unit marker; anything
/// above 10 is assumed to be a percentage and divided by 10. This is a
/// heuristic, not a unit-aware conversion, and downstream consumers
/// depend on it behaving exactly this way.
pub fn to_ten_scale(value: f64) -> f64 {
    let scaled = if value > 10.0 { value / 10.0 } else { value };
    (scaled * 100.0).round() / 100.0
}

/// Classify a score into its quality band. The scale is always supplied
/// by the caller — band thresholds differ per scale and are never
/// inferred from the value.
///
/// Boundaries are closed at the lower bound: exactly 8.0 on the ten
/// scale is `Good`, not `Fair`.
pub fn classify_score(value: f64, scale: ScoreScale) -> ScoreBand {
    match scale {
        ScoreScale::Ten => {
            if value >= 9.0 {
                ScoreBand::Excellent
            } else if value >= 8.0 {
                ScoreBand::Good
            } else if value >= 7.0 {
                ScoreBand::Fair
            } else if value >= 6.0 {
                ScoreBand::NeedsImprovement
            } else {
                ScoreBand::Poor
            }
        }
        ScoreScale::Hundred => {
            if value >= 90.0 {
                ScoreBand::Excellent
            } else if value >= 80.0 {
                ScoreBand::Good
            } else if value >= 70.0 {
                ScoreBand::Fair
            } else if value >= 60.0 {
                ScoreBand::NeedsImprovement
            } else {
                ScoreBand::Poor
            }
        }
    }
}

/// Build the full derived record for one subject from the raw indicator.
pub fn score_record(subject: impl Into<String>, raw_indicator: f64) -> ScoreRecord {
    let normalized_0_100 = to_percent_scale(raw_indicator);
    let normalized_0_10 = to_ten_scale(normalized_0_100);
    ScoreRecord {
        subject: subject.into(),
        raw_indicator,
        normalized_0_100,
        normalized_0_10,
        classification: classify_score(normalized_0_100, ScoreScale::Hundred),
    }
}
