//! Engineer leaderboard — the batch reconciliation surface.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use fp_identity::join_scores;
use fp_telematics::reports;

use crate::state::AppState;

/// GET /api/v1/engineers — CRM engineers joined against the telematics
/// score map. Engineers the provider doesn't know stay in the list at
/// score zero with their outcome marked.
pub async fn engineers_with_scores(State(state): State<AppState>) -> Json<Value> {
    let outcomes = state
        .score_cache
        .get_or_refresh(state.telematics.clone(), state.config.score_fan_out)
        .await;
    let engineers = state.crm.active_engineers().await;
    let rows = join_scores(&outcomes, &engineers);

    let with_scores = rows.iter().filter(|row| row.driving_score > 0.0).count();
    Json(json!({
        "total": rows.len(),
        "total_crm_engineers": engineers.len(),
        "with_scores": with_scores,
        "engineers": rows,
    }))
}

/// GET /api/v1/engineers/locations — engineer name → current postcode,
/// extracted from the positions report's free-text addresses.
pub async fn engineer_locations(State(state): State<AppState>) -> Json<Value> {
    let locations = reports::engineer_postcodes(state.telematics.as_ref()).await;
    Json(json!({
        "total": locations.len(),
        "locations": locations,
    }))
}
