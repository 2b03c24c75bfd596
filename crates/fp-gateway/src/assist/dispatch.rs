//! Intent dispatcher — one backend operation per recognized intent.
//!
//! Combined intents call both collaborators independently; one source
//! failing never suppresses the other's data, and the result records
//! which sources contributed.

use serde_json::{json, Map, Value};

use fp_crm::{CrmApi, CrmRow};
use fp_protocol::intent::{DataSource, ExecutionResult, Intent, IntentResult, ResultContext};
use fp_protocol::score::ScoreRecord;
use fp_scoring::score_record;
use fp_telematics::{reports, TelematicsApi};

use super::rules::HELP_HINT;

fn rows_to_value(rows: Vec<CrmRow>) -> (Option<Value>, usize) {
    let count = rows.len();
    let value = Value::Array(rows.into_iter().map(Value::Object).collect());
    (Some(value), count)
}

fn records_to_value<T: serde::Serialize>(records: Vec<T>) -> (Option<Value>, usize) {
    let count = records.len();
    let value = serde_json::to_value(records).unwrap_or(Value::Array(vec![]));
    (Some(value), count)
}

fn result(
    intent: IntentResult,
    data: Option<Value>,
    source: DataSource,
    context: ResultContext,
    count: usize,
) -> ExecutionResult {
    ExecutionResult {
        vehicle_id: intent.entity.clone(),
        intent,
        data,
        source: Some(source),
        context: Some(context),
        count,
        error: None,
    }
}

/// A required identifier was missing — no query runs, and the caller
/// gets a no-data result rather than a hard error.
fn missing_entity(intent: IntentResult, context: ResultContext) -> ExecutionResult {
    tracing::debug!(intent = %intent.intent, "intent needs a vehicle id, none resolved");
    ExecutionResult {
        intent,
        data: None,
        source: None,
        context: Some(context),
        count: 0,
        vehicle_id: None,
        error: None,
    }
}

fn days_param(intent: &IntentResult, default: i64) -> i64 {
    intent.parameters["days"].as_i64().unwrap_or(default)
}

/// Execute one classified intent against the collaborators.
pub async fn execute(
    crm: &dyn CrmApi,
    telematics: &dyn TelematicsApi,
    intent_result: IntentResult,
) -> ExecutionResult {
    tracing::debug!(intent = %intent_result.intent, "executing intent");

    match intent_result.intent {
        Intent::VehicleHealth => vehicle_health(crm, telematics, intent_result).await,

        Intent::FleetHealth => {
            let summary = reports::fleet_health_summary(telematics).await;
            let count = summary.len();
            result(
                intent_result,
                Some(Value::Object(summary)),
                DataSource::Telematics,
                ResultContext::FleetHealth,
                count,
            )
        }

        Intent::MaintenanceDue => {
            let entity = intent_result.entity.clone();
            let (data, count) = rows_to_value(crm.vehicle_maintenance(entity.as_deref()).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::MaintenanceSchedule,
                count,
            )
        }

        Intent::DrivingScores => {
            let scores = driving_scores(telematics).await;
            let (data, count) = records_to_value(scores);
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::DriverPerformance,
                count,
            )
        }

        Intent::FuelData => {
            let days = days_param(&intent_result, 7);
            let (data, count) = records_to_value(reports::fuel_records(telematics, days).await);
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::FuelAnalysis,
                count,
            )
        }

        Intent::IdleWaste => {
            let days = days_param(&intent_result, 1);
            let (data, count) = records_to_value(reports::idle_intervals(telematics, days).await);
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::IdleWaste,
                count,
            )
        }

        Intent::SpeedingAlerts => {
            let hours = intent_result.parameters["hours"].as_i64().unwrap_or(24);
            let (data, count) = records_to_value(reports::speeding_events(telematics, hours).await);
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::SafetyViolations,
                count,
            )
        }

        Intent::LiveLocation => {
            let Some(vehicle) = intent_result.entity.clone() else {
                return missing_entity(intent_result, ResultContext::LivePositions);
            };
            let location = reports::vehicle_location(telematics, &vehicle).await;
            let data = location
                .and_then(|l| serde_json::to_value(l).ok());
            let count = usize::from(data.is_some());
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::LivePositions,
                count,
            )
        }

        Intent::AllPositions => {
            let (data, count) = records_to_value(reports::all_positions(telematics).await);
            result(
                intent_result,
                data,
                DataSource::Telematics,
                ResultContext::LivePositions,
                count,
            )
        }

        Intent::VehicleCount => {
            let (data, count) = rows_to_value(crm.all_vehicles().await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleCount,
                count,
            )
        }

        Intent::CountByStatus => {
            let status = intent_result.parameters["status"]
                .as_str()
                .unwrap_or("Allocated")
                .to_string();
            let (data, count) = rows_to_value(crm.vehicles_by_status(&[status]).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleCount,
                count,
            )
        }

        Intent::VehicleInfo | Intent::VehicleLease => {
            let Some(entity) = intent_result.entity.clone() else {
                return missing_entity(intent_result, ResultContext::VehicleHealth);
            };
            let rows: Vec<CrmRow> = crm
                .vehicle_by_identifier(&entity)
                .await
                .into_iter()
                .collect();
            let (data, count) = rows_to_value(rows);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleHealth,
                count,
            )
        }

        Intent::VehicleDriver => {
            let Some(entity) = intent_result.entity.clone() else {
                return missing_entity(intent_result, ResultContext::VehicleHealth);
            };
            let (data, count) = rows_to_value(crm.vehicle_allocations(Some(&entity)).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleHealth,
                count,
            )
        }

        Intent::VehicleCosts => {
            let entity = intent_result.entity.clone();
            let (data, count) = rows_to_value(crm.vehicle_costs(entity.as_deref(), 20).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleHealth,
                count,
            )
        }

        Intent::AllDrivers => {
            let (data, count) = rows_to_value(crm.vehicle_allocations(None).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::DriverPerformance,
                count,
            )
        }

        Intent::SpareVehicles => {
            let (data, count) =
                rows_to_value(crm.vehicles_by_status(&["Spare".to_string()]).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleCount,
                count,
            )
        }

        Intent::VehiclesByLocation => {
            let Some(location) = intent_result.parameters["location"]
                .as_str()
                .map(str::to_string)
            else {
                return missing_entity(intent_result, ResultContext::VehicleCount);
            };
            let (data, count) = rows_to_value(crm.vehicles_by_location(&location).await);
            result(
                intent_result,
                data,
                DataSource::Crm,
                ResultContext::VehicleCount,
                count,
            )
        }

        Intent::Help => ExecutionResult::error_message(Intent::Help, HELP_HINT),

        Intent::Error => {
            let message = intent_result.parameters["message"]
                .as_str()
                .unwrap_or("Unable to process request")
                .to_string();
            ExecutionResult::error_message(Intent::Error, message)
        }
    }
}

/// Combined vehicle-health view: CRM record, maintenance, allocation,
/// live position, trip summary, diagnostics. Each piece degrades
/// independently; `sources` records which side contributed.
async fn vehicle_health(
    crm: &dyn CrmApi,
    telematics: &dyn TelematicsApi,
    intent_result: IntentResult,
) -> ExecutionResult {
    let Some(vehicle_id) = intent_result.entity.clone() else {
        return missing_entity(intent_result, ResultContext::VehicleHealth);
    };

    let mut health = Map::new();
    let mut crm_contributed = false;
    let mut telematics_contributed = false;

    if let Some(vehicle) = crm.vehicle_by_identifier(&vehicle_id).await {
        health.insert("vehicle_info".into(), Value::Object(vehicle));
        crm_contributed = true;
    }
    if let Some(maintenance) = crm
        .vehicle_maintenance(Some(&vehicle_id))
        .await
        .into_iter()
        .next()
    {
        health.insert("maintenance".into(), Value::Object(maintenance));
        crm_contributed = true;
    }
    if let Some(allocation) = crm
        .vehicle_allocations(Some(&vehicle_id))
        .await
        .into_iter()
        .next()
    {
        health.insert("allocation".into(), Value::Object(allocation));
        crm_contributed = true;
    }

    if let Some(location) = reports::vehicle_location(telematics, &vehicle_id).await
        && let Ok(value) = serde_json::to_value(location)
    {
        health.insert("live_location".into(), value);
        telematics_contributed = true;
    }
    if let Some(trips) = reports::trip_summary(telematics, &vehicle_id, 7).await
        && let Ok(value) = serde_json::to_value(trips)
    {
        health.insert("trip_summary".into(), value);
        telematics_contributed = true;
    }
    let diagnostics = reports::diagnostics(telematics, &vehicle_id).await;
    if !diagnostics.is_empty()
        && let Ok(value) = serde_json::to_value(diagnostics)
    {
        health.insert("diagnostics".into(), value);
        telematics_contributed = true;
    }

    let mut sources = Vec::new();
    if crm_contributed {
        sources.push(Value::String("crm".into()));
    }
    if telematics_contributed {
        sources.push(Value::String("telematics".into()));
    }

    let count = health.len();
    let data = if health.is_empty() {
        None
    } else {
        health.insert("sources".into(), Value::Array(sources));
        Some(Value::Object(health))
    };

    ExecutionResult {
        vehicle_id: Some(vehicle_id),
        intent: intent_result,
        data,
        source: Some(DataSource::Combined),
        context: Some(ResultContext::VehicleHealth),
        count,
        error: None,
    }
}

/// Fleet-wide driving scores from the optidrive report, one derived
/// score record per driver.
async fn driving_scores(telematics: &dyn TelematicsApi) -> Vec<ScoreRecord> {
    use fp_protocol::report::{DateRange, ReportKind, ReportRequest};

    let range = DateRange::last_days(chrono::Utc::now().date_naive(), 7);
    let rows = telematics
        .fetch_report(&ReportRequest::new(ReportKind::OptiDriveIndicator).with_range(range))
        .await
        .unwrap_or_default();

    rows.iter()
        .filter_map(|row| {
            let name = row.get("drivername")?.as_str()?;
            let indicator = match row.get("optidrive_indicator") {
                Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
                Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
                _ => 0.0,
            };
            Some(score_record(name, indicator))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_crm::MockCrm;
    use fp_protocol::report::ReportKind;
    use fp_telematics::MockTelematics;

    fn telematics_sample() -> MockTelematics {
        MockTelematics::new()
            .with_report(
                ReportKind::ObjectPositions,
                vec![json!({
                    "objectname": "AB12 CDE - Jane Doe - Electrical",
                    "drivername": "Jane Doe",
                    "postext": "Croydon CR0 2LX"
                })],
            )
            .with_report(
                ReportKind::TripReport,
                vec![json!({"distance": 42.0, "drivingtime": 1.5})],
            )
            .with_report(
                ReportKind::OptiDriveIndicator,
                vec![json!({"drivername": "Jane Doe", "optidrive_indicator": 0.87})],
            )
            .with_report(
                ReportKind::EventReport,
                vec![json!({"objectname": "VEH-00330", "speed": 93.0})],
            )
    }

    #[tokio::test]
    async fn vehicle_health_combines_sources() {
        let crm = MockCrm::with_sample_data();
        let telematics = telematics_sample();
        let intent = IntentResult::with_entity(Intent::VehicleHealth, "VEH-00330");

        let result = execute(&crm, &telematics, intent).await;
        assert_eq!(result.source, Some(DataSource::Combined));
        let data = result.data.unwrap();
        assert!(data.get("vehicle_info").is_some());
        assert!(data.get("allocation").is_some());
        assert!(data.get("live_location").is_some());
        assert_eq!(data["sources"], json!(["crm", "telematics"]));
    }

    #[tokio::test]
    async fn vehicle_health_partial_when_telematics_down() {
        let crm = MockCrm::with_sample_data();
        let telematics = MockTelematics::new()
            .failing(ReportKind::ObjectPositions)
            .failing(ReportKind::TripReport)
            .failing(ReportKind::DiagnosticsReport);
        let intent = IntentResult::with_entity(Intent::VehicleHealth, "VEH-00330");

        let result = execute(&crm, &telematics, intent).await;
        let data = result.data.unwrap();
        assert!(data.get("vehicle_info").is_some());
        assert!(data.get("live_location").is_none());
        assert_eq!(data["sources"], json!(["crm"]));
    }

    #[tokio::test]
    async fn vehicle_health_without_entity_is_no_data() {
        let crm = MockCrm::with_sample_data();
        let telematics = telematics_sample();
        let intent = IntentResult::new(Intent::VehicleHealth);

        let result = execute(&crm, &telematics, intent).await;
        assert!(result.data.is_none());
        assert!(result.error.is_none());
        assert_eq!(result.count, 0);
    }

    #[tokio::test]
    async fn maintenance_due_lists_crm_rows() {
        let crm = MockCrm::with_sample_data();
        let result = execute(
            &crm,
            &MockTelematics::new(),
            IntentResult::new(Intent::MaintenanceDue),
        )
        .await;
        assert_eq!(result.source, Some(DataSource::Crm));
        assert_eq!(result.count, 2);
    }

    #[tokio::test]
    async fn driving_scores_normalized() {
        let result = execute(
            &MockCrm::new(),
            &telematics_sample(),
            IntentResult::with_params(Intent::DrivingScores, json!({"days": 7})),
        )
        .await;
        let data = result.data.unwrap();
        assert_eq!(data[0]["subject"], "Jane Doe");
        assert_eq!(data[0]["normalized_0_100"], 87.0);
        assert_eq!(data[0]["normalized_0_10"], 8.7);
        assert_eq!(data[0]["classification"], "good");
    }

    #[tokio::test]
    async fn speeding_alerts_classified() {
        let result = execute(
            &MockCrm::new(),
            &telematics_sample(),
            IntentResult::with_params(Intent::SpeedingAlerts, json!({"hours": 24})),
        )
        .await;
        assert_eq!(result.count, 1);
        assert_eq!(result.data.unwrap()[0]["severity"], "critical");
    }

    #[tokio::test]
    async fn vehicle_count_from_crm() {
        let result = execute(
            &MockCrm::with_sample_data(),
            &MockTelematics::new(),
            IntentResult::new(Intent::VehicleCount),
        )
        .await;
        assert_eq!(result.count, 3);
    }

    #[tokio::test]
    async fn help_carries_usage_hint() {
        let result = execute(
            &MockCrm::new(),
            &MockTelematics::new(),
            IntentResult::new(Intent::Help),
        )
        .await;
        assert!(result.error.as_deref().unwrap().contains("VEH-00330"));
    }

    #[tokio::test]
    async fn error_intent_passes_message() {
        let intent =
            IntentResult::with_params(Intent::Error, json!({"message": "classifier offline"}));
        let result = execute(&MockCrm::new(), &MockTelematics::new(), intent).await;
        assert_eq!(result.error.as_deref(), Some("classifier offline"));
    }

    #[tokio::test]
    async fn spare_vehicles_filtered() {
        let result = execute(
            &MockCrm::with_sample_data(),
            &MockTelematics::new(),
            IntentResult::new(Intent::SpareVehicles),
        )
        .await;
        assert_eq!(result.count, 1);
    }

    #[tokio::test]
    async fn location_intent_without_param_is_no_data() {
        let result = execute(
            &MockCrm::with_sample_data(),
            &MockTelematics::new(),
            IntentResult::new(Intent::VehiclesByLocation),
        )
        .await;
        assert!(result.data.is_none());
        assert_eq!(result.count, 0);
    }
}
