use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a recorded speed reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeedSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Severity of an idle interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleSeverity {
    Low,
    Medium,
    High,
}

/// Severity classification of a diagnostic trouble code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Info,
    Warning,
    Critical,
    /// Code empty or not in a recognized family.
    Unknown,
}

/// Recommended follow-up for a diagnostic trouble code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAction {
    ServiceImmediately,
    ScheduleSoon,
    Monitor,
    Unknown,
}

/// A live position row from the object-positions report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionRecord {
    /// Provider object label, conventionally "REG - Driver Name - Trade".
    pub object_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    /// Free-text address; postcode extraction runs over this.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

/// A speeding event from the event report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeedingEvent {
    pub vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub speed_kmh: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_kmh: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    pub severity: SpeedSeverity,
}

/// An idle interval from the idling report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdleInterval {
    pub vehicle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_name: Option<String>,
    pub idle_hours: f64,
    pub severity: IdleSeverity,
}

/// A fuel consumption row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuelRecord {
    pub vehicle: String,
    pub fuel_used_litres: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Aggregated trip figures for one vehicle over a window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripSummary {
    pub vehicle: String,
    pub trips: u32,
    pub distance_km: f64,
    pub driving_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_used_litres: Option<f64>,
}

/// A diagnostic trouble-code row from the diagnostics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub vehicle: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub severity: DiagnosticSeverity,
    pub action: ServiceAction,
}
