//! Diagnostic trouble-code classification.
//!
//! Prefix rules on the code string: the class letter (P/C/B/U) plus the
//! second character pick the family; a small fixed set of codes known to
//! strand a vehicle is escalated past its family.

use fp_protocol::telemetry::{DiagnosticSeverity, ServiceAction};

/// Codes that warrant taking the vehicle off the road now, regardless of
/// family: misfire, transmission control, gear ratio, lost ECM/CAN
/// comms, ECU fault.
const SERVICE_IMMEDIATELY: &[&str] = &["P0300", "P0700", "P0730", "U0100", "U0073", "B1342"];

/// Severity of a diagnostic trouble code, from its prefix.
pub fn classify_code(code: &str) -> (DiagnosticSeverity, ServiceAction) {
    let code = code.trim().to_uppercase();
    let mut chars = code.chars();
    let class = chars.next();
    let second = chars.next();
    let third = chars.next();

    let severity = match (class, second, third) {
        (None, _, _) => DiagnosticSeverity::Unknown,
        // Generic powertrain ignition (P03xx) and transmission (P07xx)
        // faults, bus-off/lost-comms (U0xxx) and body-control (B0xxx)
        // faults can strand the vehicle.
        (Some('P'), Some('0'), Some('3')) => DiagnosticSeverity::Critical,
        (Some('P'), Some('0'), Some('7')) => DiagnosticSeverity::Critical,
        (Some('U'), Some('0'), _) => DiagnosticSeverity::Critical,
        (Some('B'), Some('0'), _) => DiagnosticSeverity::Critical,
        // Evaporative-emissions family is leak detection, not drivability.
        (Some('P'), Some('0'), Some('4')) => DiagnosticSeverity::Info,
        (Some('P' | 'C' | 'B' | 'U'), Some(d), _) if d.is_ascii_digit() => {
            DiagnosticSeverity::Warning
        }
        _ => DiagnosticSeverity::Unknown,
    };

    let action = if severity == DiagnosticSeverity::Unknown {
        ServiceAction::Unknown
    } else if SERVICE_IMMEDIATELY.contains(&code.as_str()) {
        ServiceAction::ServiceImmediately
    } else if code.starts_with("P0") {
        ServiceAction::ScheduleSoon
    } else {
        ServiceAction::Monitor
    };

    (severity, action)
}

/// Short description for the handful of codes the fleet sees most often.
pub fn describe_code(code: &str) -> Option<&'static str> {
    match code.trim().to_uppercase().as_str() {
        "P0300" => Some("Random/multiple cylinder misfire detected"),
        "P0171" => Some("System too lean (bank 1)"),
        "P0420" => Some("Catalyst efficiency below threshold (bank 1)"),
        "P0442" => Some("Evaporative emission system leak detected (small)"),
        "P0500" => Some("Vehicle speed sensor malfunction"),
        "P0700" => Some("Transmission control system malfunction"),
        "P0730" => Some("Incorrect gear ratio"),
        "U0073" => Some("Control module communication bus off"),
        "U0100" => Some("Lost communication with ECM/PCM"),
        "B1342" => Some("ECU malfunction"),
        _ => None,
    }
}
