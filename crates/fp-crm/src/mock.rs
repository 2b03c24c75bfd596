//! In-memory `CrmApi` for tests and credential-less development.

use async_trait::async_trait;
use serde_json::{json, Value};

use fp_protocol::roster::EngineerRecord;

use crate::api::{CrmApi, CrmRow};

/// A `CrmApi` backed by vectors of rows. Date-window queries treat any
/// row carrying a non-null due-date field as inside the window — tests
/// needing real date math should filter their fixture rows instead.
#[derive(Debug, Clone, Default)]
pub struct MockCrm {
    pub vehicles: Vec<CrmRow>,
    pub allocations: Vec<CrmRow>,
    pub costs: Vec<CrmRow>,
    pub engineers: Vec<EngineerRecord>,
}

fn as_row(value: Value) -> CrmRow {
    match value {
        Value::Object(map) => map,
        _ => CrmRow::new(),
    }
}

fn field<'a>(row: &'a CrmRow, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

fn matches_identifier(row: &CrmRow, identifier: &str, keys: &[&str]) -> bool {
    keys.iter()
        .any(|key| field(row, key) == Some(identifier))
}

impl MockCrm {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small fleet with enough variety for route and e2e tests.
    pub fn with_sample_data() -> Self {
        let vehicles = vec![
            as_row(json!({
                "id": "v1", "name": "VEH-00330", "registration": "AB12 CDE",
                "van_number": "101", "status": "Allocated", "trade_group": "Electrical",
                "vehicle_type": "Van", "make_model": "Transit Custom",
                "service_territory": "Croydon", "tracking_number": "T-330",
                "description": "Long wheelbase",
                "next_service_date": "2026-03-01", "next_mot_date": "2026-02-20"
            })),
            as_row(json!({
                "id": "v2", "name": "VEH-00441", "registration": "CD34 EFG",
                "van_number": "102", "status": "Spare", "trade_group": "Drainage",
                "vehicle_type": "Van", "make_model": "Sprinter",
                "service_territory": "Croydon"
            })),
            as_row(json!({
                "id": "v3", "name": "VEH-00552", "registration": "EF56 GHI",
                "van_number": "103", "status": "Garage", "trade_group": "Plumbing",
                "vehicle_type": "Tanker", "make_model": "Daily",
                "service_territory": "Romford",
                "next_mot_date": "2026-02-12"
            })),
        ];
        let allocations = vec![as_row(json!({
            "id": "a1", "vehicle_name": "VEH-00330", "registration": "AB12 CDE",
            "van_number": "101", "engineer_name": "Jane Doe",
            "engineer_email": "jane.doe@fleet.co.uk",
            "start_date": "2025-06-01", "end_date": null
        }))];
        let costs = vec![as_row(json!({
            "vehicle_name": "VEH-00330", "registration": "AB12 CDE",
            "cost_type": "Service", "amount": 240.0, "date": "2025-11-12",
            "description": "Interim service"
        }))];
        let engineers = vec![
            EngineerRecord {
                name: "Jane Doe".into(),
                email: Some("jane.doe@fleet.co.uk".into()),
                trade_group: Some("Electrical".into()),
                is_active: true,
            },
            EngineerRecord {
                name: "Sam Patel".into(),
                email: Some("sam.patel@fleet.co.uk".into()),
                trade_group: Some("Drainage".into()),
                is_active: true,
            },
        ];
        Self {
            vehicles,
            allocations,
            costs,
            engineers,
        }
    }
}

#[async_trait]
impl CrmApi for MockCrm {
    async fn all_vehicles(&self) -> Vec<CrmRow> {
        self.vehicles.clone()
    }

    async fn vehicle_by_identifier(&self, identifier: &str) -> Option<CrmRow> {
        self.vehicles
            .iter()
            .find(|row| matches_identifier(row, identifier, &["name", "registration", "van_number"]))
            .cloned()
    }

    async fn vehicles_by_status(&self, statuses: &[String]) -> Vec<CrmRow> {
        if statuses.is_empty() {
            return self.vehicles.clone();
        }
        self.vehicles
            .iter()
            .filter(|row| {
                field(row, "status").is_some_and(|s| statuses.iter().any(|wanted| wanted == s))
            })
            .cloned()
            .collect()
    }

    async fn vehicles_by_location(&self, territory: &str) -> Vec<CrmRow> {
        self.vehicles
            .iter()
            .filter(|row| field(row, "service_territory") == Some(territory))
            .cloned()
            .collect()
    }

    async fn vehicle_allocations(&self, identifier: Option<&str>) -> Vec<CrmRow> {
        match identifier {
            Some(id) => self
                .allocations
                .iter()
                .filter(|row| {
                    matches_identifier(row, id, &["vehicle_name", "registration", "van_number"])
                })
                .cloned()
                .collect(),
            None => self
                .allocations
                .iter()
                .filter(|row| row.get("end_date").is_none_or(Value::is_null))
                .cloned()
                .collect(),
        }
    }

    async fn vehicle_costs(&self, identifier: Option<&str>, limit: usize) -> Vec<CrmRow> {
        self.costs
            .iter()
            .filter(|row| match identifier {
                Some(id) => {
                    matches_identifier(row, id, &["vehicle_name", "registration", "van_number"])
                }
                None => true,
            })
            .take(limit)
            .cloned()
            .collect()
    }

    async fn vehicle_maintenance(&self, identifier: Option<&str>) -> Vec<CrmRow> {
        self.vehicles
            .iter()
            .filter(|row| match identifier {
                Some(id) => {
                    matches_identifier(row, id, &["name", "registration", "van_number"])
                }
                None => {
                    row.get("next_service_date").is_some_and(|v| !v.is_null())
                        || row.get("next_mot_date").is_some_and(|v| !v.is_null())
                }
            })
            .cloned()
            .collect()
    }

    async fn mot_due_within(&self, _days: u32) -> Vec<CrmRow> {
        self.vehicles
            .iter()
            .filter(|row| row.get("next_mot_date").is_some_and(|v| !v.is_null()))
            .cloned()
            .collect()
    }

    async fn tax_due_within(&self, _days: u32) -> Vec<CrmRow> {
        self.vehicles
            .iter()
            .filter(|row| row.get("next_tax_date").is_some_and(|v| !v.is_null()))
            .cloned()
            .collect()
    }

    async fn active_engineers(&self) -> Vec<EngineerRecord> {
        self.engineers
            .iter()
            .filter(|e| e.is_active)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identifier_lookup_any_key() {
        let crm = MockCrm::with_sample_data();
        assert!(crm.vehicle_by_identifier("VEH-00330").await.is_some());
        assert!(crm.vehicle_by_identifier("AB12 CDE").await.is_some());
        assert!(crm.vehicle_by_identifier("101").await.is_some());
        assert!(crm.vehicle_by_identifier("nope").await.is_none());
    }

    #[tokio::test]
    async fn status_filter() {
        let crm = MockCrm::with_sample_data();
        let spare = crm.vehicles_by_status(&["Spare".to_string()]).await;
        assert_eq!(spare.len(), 1);
        let all = crm.vehicles_by_status(&[]).await;
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn open_allocations_only() {
        let crm = MockCrm::with_sample_data();
        let open = crm.vehicle_allocations(None).await;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0]["engineer_name"], "Jane Doe");
    }

    #[tokio::test]
    async fn maintenance_rows_need_a_due_date() {
        let crm = MockCrm::with_sample_data();
        let due = crm.vehicle_maintenance(None).await;
        assert_eq!(due.len(), 2);
    }
}
