//! Roster report endpoint — cleaning and ranking of decoded driver rows.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use fp_identity::build_roster;
use fp_protocol::roster::RosterRow;

use crate::state::AppState;

/// POST /api/v1/roster/report — the caller decodes the roster file and
/// sends its rows; the response is the cleaned, ranked roster with
/// summary statistics.
pub async fn roster_report(
    State(_state): State<AppState>,
    Json(rows): Json<Vec<RosterRow>>,
) -> Json<Value> {
    let report = build_roster(&rows);
    tracing::debug!(
        kept = report.drivers.len(),
        rejected = report.rejected,
        empty = report.empty_names,
        "roster processed"
    );
    Json(json!({
        "success": true,
        "statistics": report.stats,
        "total": report.drivers.len(),
        "drivers": report.drivers,
        "empty_names": report.empty_names,
        "rejected": report.rejected,
    }))
}
