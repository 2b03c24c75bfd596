//! Severity classification for speeding events and idle intervals.

use fp_protocol::telemetry::{IdleSeverity, SpeedSeverity};

/// Idle intervals at or below this many hours (6 minutes) are treated as
/// measurement noise and excluded from reporting entirely.
pub const IDLE_NOISE_FLOOR_HOURS: f64 = 0.1;

/// Classify a recorded speed in km/h.
pub fn classify_speed_severity(speed_kmh: f64) -> SpeedSeverity {
    if speed_kmh > 90.0 {
        SpeedSeverity::Critical
    } else if speed_kmh > 80.0 {
        SpeedSeverity::High
    } else if speed_kmh > 70.0 {
        SpeedSeverity::Medium
    } else {
        SpeedSeverity::Low
    }
}

/// Classify an idle interval by duration in hours.
pub fn classify_idle_severity(idle_hours: f64) -> IdleSeverity {
    if idle_hours > 4.0 {
        IdleSeverity::High
    } else if idle_hours > 2.0 {
        IdleSeverity::Medium
    } else {
        IdleSeverity::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_bands() {
        assert_eq!(classify_speed_severity(95.0), SpeedSeverity::Critical);
        assert_eq!(classify_speed_severity(85.0), SpeedSeverity::High);
        assert_eq!(classify_speed_severity(75.0), SpeedSeverity::Medium);
        assert_eq!(classify_speed_severity(50.0), SpeedSeverity::Low);
    }

    #[test]
    fn speed_boundaries_are_exclusive() {
        // Thresholds are strict greater-than.
        assert_eq!(classify_speed_severity(90.0), SpeedSeverity::High);
        assert_eq!(classify_speed_severity(80.0), SpeedSeverity::Medium);
        assert_eq!(classify_speed_severity(70.0), SpeedSeverity::Low);
    }

    #[test]
    fn idle_bands() {
        assert_eq!(classify_idle_severity(5.0), IdleSeverity::High);
        assert_eq!(classify_idle_severity(3.0), IdleSeverity::Medium);
        assert_eq!(classify_idle_severity(1.0), IdleSeverity::Low);
        assert_eq!(classify_idle_severity(4.0), IdleSeverity::Medium);
        assert_eq!(classify_idle_severity(2.0), IdleSeverity::Low);
    }

    #[test]
    fn noise_floor_bounds_six_minutes() {
        assert_eq!(IDLE_NOISE_FLOOR_HOURS, 0.1);
    }
}
