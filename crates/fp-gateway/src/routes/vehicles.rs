//! Vehicle lookup, search, and listing endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

fn str_or_na(row: &fp_crm::CrmRow, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

/// GET /api/v1/vehicles/lookup/{van} — resolve a vehicle by van number
/// with driver history and current driver. Each sub-lookup degrades
/// independently.
pub async fn lookup_vehicle(
    State(state): State<AppState>,
    Path(van_number): Path<String>,
) -> ApiResult<Json<Value>> {
    let Some(vehicle) = state.crm.vehicle_by_identifier(&van_number).await else {
        return Err(ApiError::NotFound(format!(
            "vehicle with van number {van_number} not found"
        )));
    };

    let driver_history = vehicle
        .get("previous_drivers")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or("No driver history available")
        .to_string();

    let driver_name = state
        .crm
        .vehicle_allocations(Some(&van_number))
        .await
        .into_iter()
        .next()
        .and_then(|allocation| {
            allocation
                .get("engineer_name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| "No driver assigned".to_string());

    Ok(Json(json!({
        "van_number": str_or_na(&vehicle, "van_number"),
        "registration_number": str_or_na(&vehicle, "registration"),
        "tracking_number": str_or_na(&vehicle, "tracking_number"),
        "vehicle_name": str_or_na(&vehicle, "name"),
        "vehicle_type": str_or_na(&vehicle, "vehicle_type"),
        "description": str_or_na(&vehicle, "description"),
        "status": str_or_na(&vehicle, "status"),
        "driver_history": driver_history,
        "driver_name": driver_name,
    })))
}

/// Search query string.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /api/v1/vehicles/search?q= — substring match over van number,
/// name, and registration. At most 20 rows.
pub async fn search_vehicles(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Json<Value> {
    let term = query.q.to_lowercase();
    let matching: Vec<Value> = state
        .crm
        .all_vehicles()
        .await
        .into_iter()
        .filter(|row| {
            if term.is_empty() {
                return true;
            }
            ["van_number", "name", "registration"].iter().any(|key| {
                row.get(*key)
                    .and_then(Value::as_str)
                    .is_some_and(|v| v.to_lowercase().contains(&term))
            })
        })
        .take(20)
        .map(Value::Object)
        .collect();

    Json(json!({
        "search_term": query.q,
        "total_found": matching.len(),
        "vehicles": matching,
    }))
}

/// GET /api/v1/vehicles — every vehicle on file.
pub async fn list_vehicles(State(state): State<AppState>) -> Json<Value> {
    let vehicles = state.crm.all_vehicles().await;
    Json(json!({
        "total": vehicles.len(),
        "vehicles": vehicles,
    }))
}
