//! Dashboard aggregation endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

use fp_crm::CrmRow;

use crate::state::AppState;

/// CRM status value → summary bucket. Sold vehicles and unmapped
/// statuses stay out of the buckets (but count toward the total).
fn bucket_for(status: &str) -> Option<&'static str> {
    match status {
        "Allocated" | "allocated" => Some("allocated"),
        "Garage" | "garage" | "In Garage" | "Under Repair" => Some("garage"),
        "Due for Service" | "Service Due" => Some("due_service"),
        "Spare" | "Spare Ready" | "Spare Tankers" | "Spare in Garage" | "Spare Not Available" => {
            Some("spare_ready")
        }
        "Reserved" | "reserved" => Some("reserved"),
        "Written Off" => Some("written_off"),
        _ => None,
    }
}

/// Friendly status key → CRM status values. Empty vec means "no filter";
/// `None` means the key is passed through literally.
fn statuses_for_key(key: &str) -> Option<Vec<String>> {
    let values: &[&str] = match key {
        "allocated" => &["Allocated"],
        "garage" => &["Garage"],
        "due_service" => &["Due for Service", "Service Due"],
        "spare_ready" => &["Spare", "Spare Not Available"],
        "reserved" => &["Reserved"],
        "written_off" => &["Written Off"],
        "sold" => &["Sold"],
        "total" | "current" => &[],
        _ => return None,
    };
    Some(values.iter().map(|v| v.to_string()).collect())
}

/// GET /api/v1/dashboard/summary — fleet counts by status bucket plus
/// MOT/tax due within 30 days.
pub async fn vehicle_summary(State(state): State<AppState>) -> Json<Value> {
    let vehicles = state.crm.all_vehicles().await;
    let total = vehicles.len();

    let mut buckets: HashMap<&'static str, usize> = [
        ("allocated", 0),
        ("garage", 0),
        ("due_service", 0),
        ("spare_ready", 0),
        ("reserved", 0),
        ("written_off", 0),
    ]
    .into_iter()
    .collect();

    for vehicle in &vehicles {
        let Some(status) = vehicle.get("status").and_then(Value::as_str) else {
            continue;
        };
        match bucket_for(status) {
            Some(bucket) => *buckets.entry(bucket).or_default() += 1,
            None => tracing::debug!(status, "status not bucketed"),
        }
    }

    let mot_due = state.crm.mot_due_within(30).await.len();
    let tax_due = state.crm.tax_due_within(30).await.len();

    let mut body = serde_json::Map::new();
    body.insert("total".into(), total.into());
    for (bucket, count) in buckets {
        body.insert(bucket.into(), count.into());
    }
    body.insert("mot_due".into(), mot_due.into());
    body.insert("tax_due".into(), tax_due.into());
    Json(Value::Object(body))
}

/// Sum cost rows into per-vehicle totals, keyed by vehicle name.
fn cost_totals(costs: &[CrmRow], maintenance_only: bool) -> HashMap<String, f64> {
    let mut totals: HashMap<String, f64> = HashMap::new();
    for cost in costs {
        if maintenance_only {
            let cost_type = cost
                .get("cost_type")
                .and_then(Value::as_str)
                .unwrap_or_default();
            if !cost_type.contains("Service") && !cost_type.contains("Maint") {
                continue;
            }
        }
        let Some(vehicle) = cost.get("vehicle_name").and_then(Value::as_str) else {
            continue;
        };
        let amount = cost.get("amount").and_then(Value::as_f64).unwrap_or(0.0);
        *totals.entry(vehicle.to_string()).or_default() += amount;
    }
    totals
}

/// GET /api/v1/dashboard/vehicles/{status} — vehicles in one bucket with
/// cost aggregates attached.
pub async fn vehicles_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
) -> Json<Value> {
    let key = status.to_lowercase();
    let (filter, label) = match statuses_for_key(&key) {
        Some(values) if values.is_empty() => (vec![], "ALL".to_string()),
        Some(values) => {
            let label = values.join(" | ");
            (values, label)
        }
        // Unmapped keys are queried literally.
        None => (vec![status.clone()], status.clone()),
    };

    let mut vehicles = state.crm.vehicles_by_status(&filter).await;

    if !vehicles.is_empty() {
        let costs = state.crm.vehicle_costs(None, 1000).await;
        let totals = cost_totals(&costs, false);
        let maintenance = cost_totals(&costs, true);
        for vehicle in &mut vehicles {
            let name = vehicle
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            vehicle.insert(
                "service_cost".into(),
                json!(totals.get(&name).copied().unwrap_or(0.0)),
            );
            vehicle.insert(
                "maintenance_cost".into(),
                json!(maintenance.get(&name).copied().unwrap_or(0.0)),
            );
        }
    }

    Json(json!({
        "status": label,
        "count": vehicles.len(),
        "vehicles": vehicles,
    }))
}

/// Query window for the due-date endpoints.
#[derive(Debug, Deserialize)]
pub struct DueQuery {
    #[serde(default = "default_due_days")]
    pub days: u32,
}

fn default_due_days() -> u32 {
    30
}

/// GET /api/v1/dashboard/vehicles-mot-due
pub async fn vehicles_mot_due(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Json<Value> {
    let vehicles = state.crm.mot_due_within(query.days).await;
    Json(json!({"count": vehicles.len(), "vehicles": vehicles}))
}

/// GET /api/v1/dashboard/vehicles-tax-due
pub async fn vehicles_tax_due(
    State(state): State<AppState>,
    Query(query): Query<DueQuery>,
) -> Json<Value> {
    let vehicles = state.crm.tax_due_within(query.days).await;
    Json(json!({"count": vehicles.len(), "vehicles": vehicles}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_mapping_covers_variants() {
        assert_eq!(bucket_for("Allocated"), Some("allocated"));
        assert_eq!(bucket_for("Under Repair"), Some("garage"));
        assert_eq!(bucket_for("Spare Not Available"), Some("spare_ready"));
        assert_eq!(bucket_for("Written Off"), Some("written_off"));
        // Sold is deliberately unbucketed.
        assert_eq!(bucket_for("Sold"), None);
        assert_eq!(bucket_for("Mystery"), None);
    }

    #[test]
    fn status_key_mapping() {
        assert_eq!(
            statuses_for_key("due_service").unwrap(),
            vec!["Due for Service", "Service Due"]
        );
        assert_eq!(statuses_for_key("total").unwrap(), Vec::<String>::new());
        assert_eq!(statuses_for_key("current").unwrap(), Vec::<String>::new());
        assert!(statuses_for_key("weird-key").is_none());
    }

    #[test]
    fn cost_totals_sum_per_vehicle() {
        let costs: Vec<CrmRow> = [
            json!({"vehicle_name": "VEH-1", "cost_type": "Service", "amount": 100.0}),
            json!({"vehicle_name": "VEH-1", "cost_type": "Fuel", "amount": 50.0}),
            json!({"vehicle_name": "VEH-2", "cost_type": "Maintenance", "amount": 75.0}),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let totals = cost_totals(&costs, false);
        assert_eq!(totals["VEH-1"], 150.0);
        assert_eq!(totals["VEH-2"], 75.0);

        let maintenance = cost_totals(&costs, true);
        assert_eq!(maintenance["VEH-1"], 100.0);
        assert_eq!(maintenance["VEH-2"], 75.0);
    }
}
