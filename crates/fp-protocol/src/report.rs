//! Telematics report request shape.
//!
//! Every provider report shares one request form: an action token plus a
//! parameter mapping (compact `YYYYMMDD` date strings, optional object id).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Report types the telematics provider serves through its single
/// request endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    DriverRoster,
    OptiDriveIndicator,
    ObjectPositions,
    EventReport,
    FuelReport,
    IdlingReport,
    TripReport,
    DiagnosticsReport,
}

impl ReportKind {
    /// Provider-side action token for this report.
    pub fn action(&self) -> &'static str {
        match self {
            Self::DriverRoster => "showDriverReportExtern",
            Self::OptiDriveIndicator => "showOptiDriveIndicator",
            Self::ObjectPositions => "showObjectReportExtern",
            Self::EventReport => "showEventReportExtern",
            Self::FuelReport => "showFuelReportExtern",
            Self::IdlingReport => "showIdleExceptionsReportExtern",
            Self::TripReport => "showTripReportExtern",
            Self::DiagnosticsReport => "showDiagnosticsReportExtern",
        }
    }
}

/// Inclusive date range, serialized as compact `YYYYMMDD` strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// The window of the last `days` days ending at `today`.
    pub fn last_days(today: NaiveDate, days: i64) -> Self {
        Self {
            from: today - chrono::Duration::days(days),
            to: today,
        }
    }

    /// The window of the last `hours` hours, widened to whole days as the
    /// provider's report API only accepts day granularity.
    pub fn last_hours(today: NaiveDate, hours: i64) -> Self {
        Self::last_days(today, (hours + 23) / 24)
    }

    pub fn from_compact(&self) -> String {
        self.from.format("%Y%m%d").to_string()
    }

    pub fn to_compact(&self) -> String {
        self.to.format("%Y%m%d").to_string()
    }
}

/// One report request: the token plus its parameter mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRequest {
    pub kind: ReportKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<DateRange>,
    /// Optional entity (vehicle/object) id to scope the report to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
}

impl ReportRequest {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            range: None,
            object: None,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn for_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tokens() {
        assert_eq!(ReportKind::DriverRoster.action(), "showDriverReportExtern");
        assert_eq!(
            ReportKind::OptiDriveIndicator.action(),
            "showOptiDriveIndicator"
        );
    }

    #[test]
    fn range_formats_compact() {
        let range = DateRange {
            from: NaiveDate::from_ymd_opt(2026, 1, 28).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
        };
        assert_eq!(range.from_compact(), "20260128");
        assert_eq!(range.to_compact(), "20260204");
    }

    #[test]
    fn last_days_window() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let range = DateRange::last_days(today, 7);
        assert_eq!(range.from_compact(), "20260128");
        assert_eq!(range.to_compact(), "20260204");
    }

    #[test]
    fn last_hours_rounds_up_to_days() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 4).unwrap();
        let range = DateRange::last_hours(today, 24);
        assert_eq!(range.from_compact(), "20260203");
        let range = DateRange::last_hours(today, 36);
        assert_eq!(range.from_compact(), "20260202");
    }

    #[test]
    fn request_builder() {
        let req = ReportRequest::new(ReportKind::TripReport)
            .with_range(DateRange::last_days(
                NaiveDate::from_ymd_opt(2026, 2, 4).unwrap(),
                7,
            ))
            .for_object("VEH-00330");
        assert_eq!(req.kind, ReportKind::TripReport);
        assert_eq!(req.object.as_deref(), Some("VEH-00330"));
        assert!(req.range.is_some());
    }
}
