//! Batch reconciliation: join the telematics score map against the CRM
//! engineer roster.
//!
//! The score map is keyed by normalized email. Engineers whose email is
//! absent from the map are still emitted — at score zero, with the
//! outcome marked unscored — so "no data" stays distinguishable from a
//! genuine zero without changing the outward numbers.

use std::collections::HashMap;

use fp_protocol::roster::{EngineerRecord, EngineerScore};
use fp_protocol::score::{ScoreOutcome, ScoreScale};
use fp_scoring::{classify_score, to_percent_scale, to_ten_scale};

use crate::normalize::normalize_email;

/// Join score outcomes (keyed by normalized email) against the engineer
/// roster, producing the ranked leaderboard.
///
/// Inactive engineers and engineers without an email are excluded from
/// matching entirely; everyone else appears in the output. Sorted by
/// driving score descending, then name ascending, with 1-based ranks.
pub fn join_scores(
    outcomes: &HashMap<String, ScoreOutcome>,
    engineers: &[EngineerRecord],
) -> Vec<EngineerScore> {
    let mut rows: Vec<EngineerScore> = engineers
        .iter()
        .filter(|engineer| engineer.is_active)
        .filter_map(|engineer| {
            let email = engineer.email.as_deref()?;
            let key = normalize_email(email);
            if key.is_empty() {
                return None;
            }

            let outcome = outcomes.get(&key).copied().unwrap_or(ScoreOutcome::Unscored);
            let percent = to_percent_scale(outcome.indicator_or_zero());
            let driving_score = if percent > 0.0 {
                to_ten_scale(percent)
            } else {
                0.0
            };

            Some(EngineerScore {
                rank: 0,
                name: engineer.name.clone(),
                email: email.to_string(),
                van_number: "N/A".into(),
                trade_group: engineer
                    .trade_group
                    .clone()
                    .unwrap_or_else(|| "N/A".into()),
                driving_score,
                score_class: classify_score(percent, ScoreScale::Hundred),
                outcome,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.driving_score
            .partial_cmp(&a.driving_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    for (index, row) in rows.iter_mut().enumerate() {
        row.rank = index + 1;
    }
    rows
}
