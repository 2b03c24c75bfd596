use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A supported query operation derivable from a free-text question.
///
/// The first group is produced by the keyword rule classifier; the second
/// only by the LLM classifier. `Error` marks a classification failure in
/// the LLM path (malformed output is never guessed at).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    VehicleHealth,
    FleetHealth,
    MaintenanceDue,
    DrivingScores,
    FuelData,
    IdleWaste,
    SpeedingAlerts,
    LiveLocation,
    AllPositions,
    VehicleCount,
    Help,

    CountByStatus,
    VehicleInfo,
    VehicleLease,
    VehicleDriver,
    VehicleCosts,
    AllDrivers,
    SpareVehicles,
    VehiclesByLocation,

    Error,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VehicleHealth => "vehicle_health",
            Self::FleetHealth => "fleet_health",
            Self::MaintenanceDue => "maintenance_due",
            Self::DrivingScores => "driving_scores",
            Self::FuelData => "fuel_data",
            Self::IdleWaste => "idle_waste",
            Self::SpeedingAlerts => "speeding_alerts",
            Self::LiveLocation => "live_location",
            Self::AllPositions => "all_positions",
            Self::VehicleCount => "vehicle_count",
            Self::Help => "help",
            Self::CountByStatus => "count_by_status",
            Self::VehicleInfo => "vehicle_info",
            Self::VehicleLease => "vehicle_lease",
            Self::VehicleDriver => "vehicle_driver",
            Self::VehicleCosts => "vehicle_costs",
            Self::AllDrivers => "all_drivers",
            Self::SpareVehicles => "spare_vehicles",
            Self::VehiclesByLocation => "vehicles_by_location",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn empty_params() -> Value {
    Value::Object(serde_json::Map::new())
}

/// Structured classification of one user question. Immutable once built,
/// consumed exactly once by the dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Resolved vehicle identifier, when the intent needs one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Intent-specific parameters (day windows, status filters, ...).
    #[serde(default = "empty_params")]
    pub parameters: Value,
}

impl IntentResult {
    pub fn new(intent: Intent) -> Self {
        Self {
            intent,
            entity: None,
            parameters: empty_params(),
        }
    }

    pub fn with_entity(intent: Intent, entity: impl Into<String>) -> Self {
        Self {
            intent,
            entity: Some(entity.into()),
            parameters: empty_params(),
        }
    }

    pub fn with_params(intent: Intent, parameters: Value) -> Self {
        Self {
            intent,
            entity: None,
            parameters,
        }
    }
}

/// Which source system(s) produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Crm,
    Telematics,
    Combined,
}

/// Rendering context attached to an execution result; the formatter picks
/// its template from this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultContext {
    VehicleHealth,
    FleetHealth,
    MaintenanceSchedule,
    DriverPerformance,
    FuelAnalysis,
    IdleWaste,
    SafetyViolations,
    LivePositions,
    VehicleCount,
}

/// Outcome of dispatching one intent against the collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub intent: IntentResult,
    /// Retrieved rows or mapping; None when nothing came back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<ResultContext>,
    #[serde(default)]
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionResult {
    /// A result carrying only an informational error line.
    pub fn error_message(intent: Intent, message: impl Into<String>) -> Self {
        Self {
            intent: IntentResult::new(intent),
            data: None,
            source: None,
            context: None,
            count: 0,
            vehicle_id: None,
            error: Some(message.into()),
        }
    }
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Assistant,
}

/// One turn of the rolling conversation history. Used only to resolve
/// pronouns to the most recently mentioned vehicle id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    #[serde(default)]
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn intent_serialization() {
        assert_eq!(
            serde_json::to_string(&Intent::VehicleHealth).unwrap(),
            r#""vehicle_health""#
        );
        assert_eq!(
            serde_json::to_string(&Intent::VehiclesByLocation).unwrap(),
            r#""vehicles_by_location""#
        );
    }

    #[test]
    fn intent_result_defaults_empty_params() {
        let parsed: IntentResult =
            serde_json::from_str(r#"{"intent": "fuel_data"}"#).unwrap();
        assert_eq!(parsed.intent, Intent::FuelData);
        assert_eq!(parsed.parameters, json!({}));
        assert!(parsed.entity.is_none());
    }

    #[test]
    fn execution_result_roundtrip() {
        let result = ExecutionResult {
            intent: IntentResult::with_entity(Intent::VehicleHealth, "VEH-00330"),
            data: Some(json!({"vehicle_info": {"name": "VEH-00330"}})),
            source: Some(DataSource::Combined),
            context: Some(ResultContext::VehicleHealth),
            count: 1,
            vehicle_id: Some("VEH-00330".into()),
            error: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains(r#""source":"combined""#));
        assert!(!json.contains("error"));
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.intent.entity.as_deref(), Some("VEH-00330"));
    }

    #[test]
    fn turn_role_defaults_to_user() {
        let turn: ConversationTurn =
            serde_json::from_str(r#"{"content": "tell me about VEH-123"}"#).unwrap();
        assert_eq!(turn.role, Role::User);
    }
}
