//! Driving-score lookup and the batch reconciliation fan-out.
//!
//! The per-email lookup is two provider calls: find the driver in the
//! roster by email, then find their row in the optidrive report by the
//! provider-side display name. The batch runs one lookup per email
//! through a bounded worker pool; one entry failing degrades that entry
//! alone, never the batch.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use fp_identity::{match_driver, normalize_email, MatchTarget};
use fp_protocol::report::{DateRange, ReportKind, ReportRequest};
use fp_protocol::roster::DriverRecord;
use fp_protocol::score::ScoreOutcome;

use crate::api::TelematicsApi;
use crate::reports::{driver_roster, parse_driver_roster};

/// Scoring window: the provider's driving indicator over the last week.
const SCORE_WINDOW_DAYS: i64 = 7;

/// Default worker-pool width for the batch fan-out.
pub const DEFAULT_FAN_OUT: usize = 8;

/// Look up one driver's 0–1 driving indicator by email.
///
/// Transport failures map to `Error`; a driver missing from either
/// report maps to `Unscored`; an unparseable indicator value scores as
/// zero, matching the provider's own rendering of "no data".
pub async fn lookup_score_by_email(api: &dyn TelematicsApi, email: &str) -> ScoreOutcome {
    let Some(roster_rows) = api
        .fetch_report(&ReportRequest::new(ReportKind::DriverRoster))
        .await
    else {
        return ScoreOutcome::Error;
    };
    let roster = parse_driver_roster(&roster_rows);

    let Some(driver) = match_driver(MatchTarget::Email(email), &roster) else {
        tracing::debug!(email, "driver not in telematics roster");
        return ScoreOutcome::Unscored;
    };
    let provider_name = driver.display_name.clone();

    let range = DateRange::last_days(Utc::now().date_naive(), SCORE_WINDOW_DAYS);
    let Some(opti_rows) = api
        .fetch_report(&ReportRequest::new(ReportKind::OptiDriveIndicator).with_range(range))
        .await
    else {
        return ScoreOutcome::Error;
    };

    let candidates = parse_optidrive_rows(&opti_rows);
    match match_driver(MatchTarget::Name(&provider_name), &candidates) {
        Some(row) => ScoreOutcome::Scored {
            indicator: row
                .raw_fields
                .get("optidrive_indicator")
                .and_then(indicator_value)
                .unwrap_or(0.0),
        },
        None => {
            tracing::debug!(name = %provider_name, "no optidrive row for driver");
            ScoreOutcome::Unscored
        }
    }
}

/// Optidrive rows keyed by `drivername`; the indicator rides along in
/// `raw_fields` so the name matcher can run over plain driver records.
fn parse_optidrive_rows(rows: &[Value]) -> Vec<DriverRecord> {
    rows.iter()
        .filter_map(|row| {
            let name = row.get("drivername")?.as_str()?.to_string();
            let mut raw_fields = HashMap::new();
            if let Some(indicator) = row.get("optidrive_indicator") {
                raw_fields.insert("optidrive_indicator".to_string(), indicator.clone());
            }
            Some(DriverRecord {
                display_name: name,
                email: String::new(),
                raw_fields,
            })
        })
        .collect()
}

fn indicator_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Run score lookups for many emails through a bounded worker pool.
/// Keys of the returned map are normalized emails.
pub async fn batch_scores(
    api: Arc<dyn TelematicsApi>,
    emails: Vec<String>,
    fan_out: usize,
) -> HashMap<String, ScoreOutcome> {
    let semaphore = Arc::new(Semaphore::new(fan_out.max(1)));
    let mut tasks = JoinSet::new();

    for email in emails {
        let key = normalize_email(&email);
        if key.is_empty() {
            continue;
        }
        let api = Arc::clone(&api);
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .expect("score fan-out semaphore closed");
            let outcome = lookup_score_by_email(api.as_ref(), &email).await;
            (key, outcome)
        });
    }

    let mut outcomes = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((email, outcome)) => {
                outcomes.insert(email, outcome);
            }
            Err(e) => tracing::warn!(error = %e, "score lookup task failed"),
        }
    }
    outcomes
}

/// Fetch the driver roster and score every driver that has an email.
pub async fn gather_fleet_scores(
    api: Arc<dyn TelematicsApi>,
    fan_out: usize,
) -> HashMap<String, ScoreOutcome> {
    let emails: Vec<String> = driver_roster(api.as_ref())
        .await
        .into_iter()
        .map(|driver| driver.email)
        .filter(|email| !email.trim().is_empty())
        .collect();
    tracing::debug!(count = emails.len(), "scoring telematics drivers");
    batch_scores(api, emails, fan_out).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTelematics;
    use serde_json::json;

    fn scored_provider() -> MockTelematics {
        MockTelematics::new()
            .with_report(
                ReportKind::DriverRoster,
                vec![
                    json!({"name1": "Jane Doe", "email": "Jane.Doe@Fleet.CO.UK"}),
                    json!({"name1": "No Score", "email": "none@fleet.co.uk"}),
                    json!({"name1": "Blank Email", "email": ""}),
                ],
            )
            .with_report(
                ReportKind::OptiDriveIndicator,
                vec![json!({"drivername": "Jane Doe", "optidrive_indicator": 0.87})],
            )
    }

    #[tokio::test]
    async fn lookup_matches_email_then_name() {
        let api = scored_provider();
        let outcome = lookup_score_by_email(&api, "jane.doe@fleet.co.uk").await;
        assert_eq!(outcome, ScoreOutcome::Scored { indicator: 0.87 });
    }

    #[tokio::test]
    async fn lookup_unscored_when_driver_missing() {
        let api = scored_provider();
        let outcome = lookup_score_by_email(&api, "ghost@fleet.co.uk").await;
        assert_eq!(outcome, ScoreOutcome::Unscored);
    }

    #[tokio::test]
    async fn lookup_unscored_when_no_optidrive_row() {
        let api = scored_provider();
        let outcome = lookup_score_by_email(&api, "none@fleet.co.uk").await;
        assert_eq!(outcome, ScoreOutcome::Unscored);
    }

    #[tokio::test]
    async fn lookup_error_on_roster_failure() {
        let api = MockTelematics::new().failing(ReportKind::DriverRoster);
        let outcome = lookup_score_by_email(&api, "jane@x.com").await;
        assert_eq!(outcome, ScoreOutcome::Error);
    }

    #[tokio::test]
    async fn lookup_error_on_optidrive_failure() {
        let api = MockTelematics::new()
            .with_report(
                ReportKind::DriverRoster,
                vec![json!({"name1": "Jane Doe", "email": "jane@x.com"})],
            )
            .failing(ReportKind::OptiDriveIndicator);
        let outcome = lookup_score_by_email(&api, "jane@x.com").await;
        assert_eq!(outcome, ScoreOutcome::Error);
    }

    #[tokio::test]
    async fn string_indicator_parsed() {
        let api = MockTelematics::new()
            .with_report(
                ReportKind::DriverRoster,
                vec![json!({"name1": "Jane Doe", "email": "jane@x.com"})],
            )
            .with_report(
                ReportKind::OptiDriveIndicator,
                vec![json!({"drivername": "jane doe (NW10)", "optidrive_indicator": "0.72"})],
            );
        let outcome = lookup_score_by_email(&api, "jane@x.com").await;
        assert_eq!(outcome, ScoreOutcome::Scored { indicator: 0.72 });
    }

    #[tokio::test]
    async fn garbled_indicator_scores_zero() {
        let api = MockTelematics::new()
            .with_report(
                ReportKind::DriverRoster,
                vec![json!({"name1": "Jane Doe", "email": "jane@x.com"})],
            )
            .with_report(
                ReportKind::OptiDriveIndicator,
                vec![json!({"drivername": "Jane Doe", "optidrive_indicator": "n/a"})],
            );
        let outcome = lookup_score_by_email(&api, "jane@x.com").await;
        assert_eq!(outcome, ScoreOutcome::Scored { indicator: 0.0 });
    }

    #[tokio::test]
    async fn batch_keys_are_normalized_and_isolated() {
        let api: Arc<dyn TelematicsApi> = Arc::new(scored_provider());
        let outcomes = batch_scores(
            api,
            vec![
                "Jane.Doe@Fleet.CO.UK".to_string(),
                "ghost@fleet.co.uk".to_string(),
                "   ".to_string(),
            ],
            2,
        )
        .await;

        assert_eq!(outcomes.len(), 2);
        assert_eq!(
            outcomes["jane.doe@fleet.co.uk"],
            ScoreOutcome::Scored { indicator: 0.87 }
        );
        assert_eq!(outcomes["ghost@fleet.co.uk"], ScoreOutcome::Unscored);
    }

    #[tokio::test]
    async fn gather_scores_whole_roster() {
        let api: Arc<dyn TelematicsApi> = Arc::new(scored_provider());
        let outcomes = gather_fleet_scores(api, DEFAULT_FAN_OUT).await;
        // Blank-email driver is skipped; the other two get outcomes.
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes["none@fleet.co.uk"], ScoreOutcome::Unscored);
    }
}
