//! Roster cleaning: turn decoded driver-roster rows into a ranked list
//! with summary statistics. File decoding happens upstream; this pass
//! only filters, normalizes, and ranks.

use fp_protocol::roster::{RosterDriver, RosterRow, RosterStats};
use fp_protocol::score::ScoreScale;
use fp_scoring::{classify_score, to_ten_scale};

use crate::normalize::is_plausible_human_name;

/// Outcome of the cleaning pass.
#[derive(Debug, Clone)]
pub struct RosterReport {
    pub drivers: Vec<RosterDriver>,
    pub stats: RosterStats,
    /// Rows dropped because the name was empty.
    pub empty_names: usize,
    /// Rows dropped by the plausibility filter.
    pub rejected: usize,
}

/// Clean, rank, and summarize decoded roster rows.
pub fn build_roster(rows: &[RosterRow]) -> RosterReport {
    let mut drivers = Vec::new();
    let mut empty_names = 0usize;
    let mut rejected = 0usize;

    for row in rows {
        let name = row.name.trim();
        if name.is_empty() {
            empty_names += 1;
            continue;
        }
        if !is_plausible_human_name(name) {
            rejected += 1;
            tracing::debug!(name, "roster row rejected by name filter");
            continue;
        }

        let score = to_ten_scale(row.score.unwrap_or(0.0));
        let van_number = row
            .van_number
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or("N/A")
            .to_string();

        drivers.push(RosterDriver {
            rank: 0,
            name: name.to_string(),
            email: "N/A".into(),
            score,
            van_number,
            trade_group: "N/A".into(),
            score_class: classify_score(score, ScoreScale::Ten),
        });
    }

    drivers.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    for (index, driver) in drivers.iter_mut().enumerate() {
        driver.rank = index + 1;
    }

    let stats = compute_stats(&drivers);

    RosterReport {
        drivers,
        stats,
        empty_names,
        rejected,
    }
}

fn compute_stats(drivers: &[RosterDriver]) -> RosterStats {
    let scores: Vec<f64> = drivers
        .iter()
        .map(|d| d.score)
        .filter(|s| *s > 0.0)
        .collect();

    let average = if scores.is_empty() {
        0.0
    } else {
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        (mean * 100.0).round() / 100.0
    };

    RosterStats {
        total_drivers: drivers.len(),
        drivers_with_scores: scores.len(),
        average_score: average,
        highest_score: scores.iter().copied().fold(0.0, f64::max),
        lowest_score: if scores.is_empty() {
            0.0
        } else {
            scores.iter().copied().fold(f64::INFINITY, f64::min)
        },
        excellent: scores.iter().filter(|s| **s >= 9.0).count(),
        good: scores.iter().filter(|s| **s >= 8.0 && **s < 9.0).count(),
        fair: scores.iter().filter(|s| **s >= 7.0 && **s < 8.0).count(),
        needs_improvement: scores.iter().filter(|s| **s >= 6.0 && **s < 7.0).count(),
        poor: scores.iter().filter(|s| **s < 6.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_protocol::score::ScoreBand;

    fn row(name: &str, score: Option<f64>, van: Option<&str>) -> RosterRow {
        RosterRow {
            name: name.to_string(),
            score,
            van_number: van.map(str::to_string),
        }
    }

    #[test]
    fn filters_empty_and_garbage_names() {
        let report = build_roster(&[
            row("John Smith", Some(8.5), Some("V12")),
            row("", Some(7.0), None),
            row("File \"load.py\", line 22", Some(6.0), None),
        ]);
        assert_eq!(report.drivers.len(), 1);
        assert_eq!(report.empty_names, 1);
        assert_eq!(report.rejected, 1);
    }

    #[test]
    fn percent_scores_normalized_to_ten() {
        let report = build_roster(&[row("A B", Some(87.0), None)]);
        assert_eq!(report.drivers[0].score, 8.7);
        assert_eq!(report.drivers[0].score_class, ScoreBand::Good);
    }

    #[test]
    fn missing_van_becomes_placeholder() {
        let report = build_roster(&[row("A B", Some(8.0), None), row("C D", Some(8.0), Some(" "))]);
        assert!(report.drivers.iter().all(|d| d.van_number == "N/A"));
    }

    #[test]
    fn ranking_and_stats() {
        let report = build_roster(&[
            row("Low", Some(5.0), None),
            row("High", Some(9.5), None),
            row("Mid", Some(7.5), None),
            row("None", None, None),
        ]);

        let names: Vec<&str> = report.drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["High", "Mid", "Low", "None"]);
        assert_eq!(report.drivers[0].rank, 1);

        let stats = &report.stats;
        assert_eq!(stats.total_drivers, 4);
        assert_eq!(stats.drivers_with_scores, 3);
        assert_eq!(stats.highest_score, 9.5);
        assert_eq!(stats.lowest_score, 5.0);
        assert_eq!(stats.average_score, 7.33);
        assert_eq!(stats.excellent, 1);
        assert_eq!(stats.fair, 1);
        assert_eq!(stats.poor, 1);
    }

    #[test]
    fn empty_input_yields_zeroed_stats() {
        let report = build_roster(&[]);
        assert!(report.drivers.is_empty());
        assert_eq!(report.stats.average_score, 0.0);
        assert_eq!(report.stats.lowest_score, 0.0);
    }
}
