//! Typed views over raw report rows.
//!
//! Report payloads arrive as flat JSON objects with provider field
//! names. Everything here tolerates missing or oddly-typed fields —
//! numeric values in particular can arrive as strings — and degrades a
//! failed fetch to an empty result.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

use fp_identity::{extract_postcode, normalize_name};
use fp_protocol::report::{DateRange, ReportKind, ReportRequest};
use fp_protocol::roster::DriverRecord;
use fp_protocol::telemetry::{
    DiagnosticRecord, FuelRecord, IdleInterval, PositionRecord, SpeedingEvent, TripSummary,
};
use fp_scoring::{
    classify_code, classify_idle_severity, classify_speed_severity, describe_code,
    events::IDLE_NOISE_FLOOR_HOURS,
};

use crate::api::TelematicsApi;

/// Read a numeric field that may be serialized as a number or a string.
fn number_field(row: &Value, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn str_field<'a>(row: &'a Value, key: &str) -> Option<&'a str> {
    row.get(key).and_then(Value::as_str)
}

fn time_field(row: &Value, key: &str) -> Option<DateTime<Utc>> {
    str_field(row, key)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

fn today() -> chrono::NaiveDate {
    Utc::now().date_naive()
}

/// Parse driver-roster rows into records.
pub fn parse_driver_roster(rows: &[Value]) -> Vec<DriverRecord> {
    rows.iter()
        .filter(|row| row.is_object())
        .map(|row| {
            let display_name = str_field(row, "name1").unwrap_or_default().to_string();
            let email = str_field(row, "email").unwrap_or_default().to_string();
            let raw_fields = row
                .as_object()
                .map(|map| {
                    map.iter()
                        .filter(|(k, _)| *k != "name1" && *k != "email")
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default();
            DriverRecord {
                display_name,
                email,
                raw_fields,
            }
        })
        .collect()
}

/// The full driver roster, or empty on collaborator failure.
pub async fn driver_roster(api: &dyn TelematicsApi) -> Vec<DriverRecord> {
    let rows = api
        .fetch_report(&ReportRequest::new(ReportKind::DriverRoster))
        .await
        .unwrap_or_default();
    parse_driver_roster(&rows)
}

fn parse_position(row: &Value) -> Option<PositionRecord> {
    let object_name = str_field(row, "objectname")?.to_string();
    Some(PositionRecord {
        object_name,
        driver_name: str_field(row, "drivername").map(str::to_string),
        address: str_field(row, "postext").map(str::to_string),
        latitude: number_field(row, "latitude"),
        longitude: number_field(row, "longitude"),
    })
}

/// Current positions for the whole fleet.
pub async fn all_positions(api: &dyn TelematicsApi) -> Vec<PositionRecord> {
    api.fetch_report(&ReportRequest::new(ReportKind::ObjectPositions))
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(parse_position)
        .collect()
}

/// Live position of one vehicle.
pub async fn vehicle_location(api: &dyn TelematicsApi, vehicle: &str) -> Option<PositionRecord> {
    api.fetch_report(&ReportRequest::new(ReportKind::ObjectPositions).for_object(vehicle))
        .await?
        .iter()
        .find_map(parse_position)
}

/// Map engineer name → current postcode, built from the positions
/// report. The object label is conventionally "REG - Name - Trade"; when
/// it doesn't split, the driver-name field is used instead.
pub async fn engineer_postcodes(api: &dyn TelematicsApi) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for position in all_positions(api).await {
        let parts: Vec<&str> = position.object_name.split(" - ").collect();
        let engineer = if parts.len() > 1 {
            parts[1].trim().to_string()
        } else {
            position.driver_name.clone().unwrap_or_default()
        };
        if engineer.is_empty() || engineer == "Unknown" {
            continue;
        }
        let Some(address) = &position.address else {
            continue;
        };
        if let Some(postcode) = extract_postcode(address) {
            out.insert(normalize_name(&engineer), postcode);
        }
    }
    out
}

/// Speeding events over the last `hours`, classified by severity.
pub async fn speeding_events(api: &dyn TelematicsApi, hours: i64) -> Vec<SpeedingEvent> {
    let range = DateRange::last_hours(today(), hours);
    api.fetch_report(&ReportRequest::new(ReportKind::EventReport).with_range(range))
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            let vehicle = str_field(row, "objectname")?.to_string();
            let speed_kmh = number_field(row, "speed")?;
            Some(SpeedingEvent {
                vehicle,
                driver_name: str_field(row, "drivername").map(str::to_string),
                speed_kmh,
                limit_kmh: number_field(row, "speedlimit"),
                occurred_at: time_field(row, "eventtime"),
                severity: classify_speed_severity(speed_kmh),
            })
        })
        .collect()
}

/// Idle intervals over the last `days`, with the noise floor applied.
pub async fn idle_intervals(api: &dyn TelematicsApi, days: i64) -> Vec<IdleInterval> {
    let range = DateRange::last_days(today(), days);
    api.fetch_report(&ReportRequest::new(ReportKind::IdlingReport).with_range(range))
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            let vehicle = str_field(row, "objectname")?.to_string();
            let idle_hours = number_field(row, "idle_hours")?;
            if idle_hours <= IDLE_NOISE_FLOOR_HOURS {
                return None;
            }
            Some(IdleInterval {
                vehicle,
                driver_name: str_field(row, "drivername").map(str::to_string),
                idle_hours,
                severity: classify_idle_severity(idle_hours),
            })
        })
        .collect()
}

/// Fuel consumption rows over the last `days`.
pub async fn fuel_records(api: &dyn TelematicsApi, days: i64) -> Vec<FuelRecord> {
    let range = DateRange::last_days(today(), days);
    api.fetch_report(&ReportRequest::new(ReportKind::FuelReport).with_range(range))
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            Some(FuelRecord {
                vehicle: str_field(row, "objectname")?.to_string(),
                fuel_used_litres: number_field(row, "fuelusage")?,
                distance_km: number_field(row, "distance"),
            })
        })
        .collect()
}

/// Aggregate trip figures for one vehicle over the last `days`.
pub async fn trip_summary(
    api: &dyn TelematicsApi,
    vehicle: &str,
    days: i64,
) -> Option<TripSummary> {
    let range = DateRange::last_days(today(), days);
    let rows = api
        .fetch_report(
            &ReportRequest::new(ReportKind::TripReport)
                .with_range(range)
                .for_object(vehicle),
        )
        .await?;
    if rows.is_empty() {
        return None;
    }

    let mut trips = 0u32;
    let mut distance_km = 0.0;
    let mut driving_hours = 0.0;
    let mut fuel = 0.0;
    let mut has_fuel = false;
    for row in &rows {
        trips += 1;
        distance_km += number_field(row, "distance").unwrap_or(0.0);
        driving_hours += number_field(row, "drivingtime").unwrap_or(0.0);
        if let Some(litres) = number_field(row, "fuelusage") {
            fuel += litres;
            has_fuel = true;
        }
    }

    Some(TripSummary {
        vehicle: vehicle.to_string(),
        trips,
        distance_km,
        driving_hours,
        fuel_used_litres: has_fuel.then_some(fuel),
    })
}

/// Diagnostic trouble codes reported for one vehicle.
pub async fn diagnostics(api: &dyn TelematicsApi, vehicle: &str) -> Vec<DiagnosticRecord> {
    api.fetch_report(&ReportRequest::new(ReportKind::DiagnosticsReport).for_object(vehicle))
        .await
        .unwrap_or_default()
        .iter()
        .filter_map(|row| {
            let code = str_field(row, "dtccode")?.to_string();
            let (severity, action) = classify_code(&code);
            Some(DiagnosticRecord {
                vehicle: str_field(row, "objectname").unwrap_or(vehicle).to_string(),
                description: describe_code(&code).map(str::to_string),
                code,
                severity,
                action,
            })
        })
        .collect()
}

/// Fleet-wide health counts from the roster and positions reports.
pub async fn fleet_health_summary(api: &dyn TelematicsApi) -> serde_json::Map<String, Value> {
    let positions = all_positions(api).await;
    let drivers = driver_roster(api).await;

    let with_address = positions.iter().filter(|p| p.address.is_some()).count();
    let mut summary = serde_json::Map::new();
    summary.insert("vehicles_tracked".into(), positions.len().into());
    summary.insert("drivers_on_file".into(), drivers.len().into());
    summary.insert("positions_with_address".into(), with_address.into());
    summary
}
