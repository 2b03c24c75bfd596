//! Response formatter — deterministic templates plus the plain-text
//! sanitizer.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use fp_protocol::intent::{ExecutionResult, ResultContext};

/// Fixed answer when a query produced nothing. Deliberately
/// non-committal — "no rows" and "collaborator down" look the same here.
const NO_DATA_MESSAGE: &str = "ℹ️ No data available for this query.\n\nPossible reasons:\n• Service temporarily unavailable\n• No matching records\n• Data not yet synced";

static RE_STARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*{2,}").unwrap());
static RE_DASHES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-{3,}").unwrap());
static RE_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Emoji filter over the pictograph/symbol ranges. Compiled lazily; when
/// compilation fails the literal fallback list below is used instead.
static RE_EMOJI: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        "[\u{1F300}-\u{1F6FF}\u{1F900}-\u{1F9FF}\u{1F1E0}-\u{1F1FF}\u{2600}-\u{27BF}]",
    )
    .ok()
});

/// Glyphs we actually emit, stripped one by one when the range filter is
/// unavailable.
const EMOJI_FALLBACK: &[&str] = &[
    "🟢", "🔴", "📍", "📅", "🏆", "🥇", "🥈", "🥉", "💡", "🔧", "⚠️", "🚗", "📊", "📈",
];

/// Render an execution result with today's date.
pub fn format_response(result: &ExecutionResult) -> String {
    format_with_date(result, chrono::Utc::now().date_naive())
}

/// Render an execution result against an explicit date (for tests).
pub fn format_with_date(result: &ExecutionResult, date: NaiveDate) -> String {
    if let Some(error) = &result.error {
        return format!("ℹ️ {error}");
    }

    let Some(data) = &result.data else {
        return NO_DATA_MESSAGE.to_string();
    };
    if data.as_array().is_some_and(Vec::is_empty)
        || data.as_object().is_some_and(serde_json::Map::is_empty)
    {
        return NO_DATA_MESSAGE.to_string();
    }

    let date_str = date.format("%B %d, %Y").to_string();

    if result.context == Some(ResultContext::VehicleHealth)
        && let Some(map) = data.as_object()
        && map.contains_key("sources")
    {
        return vehicle_health_report(map, result.vehicle_id.as_deref(), &date_str);
    }

    let mut response = format!("Date: {date_str}\n\nResults:\n");
    match data {
        Value::Array(rows) => {
            response.push_str(&format!("Found {} records\n", rows.len()));
        }
        Value::Object(map) => {
            for (key, value) in map {
                response.push_str(&format!("- {key}: {}\n", display(value)));
            }
        }
        other => {
            response.push_str(&format!("{}\n", display(other)));
        }
    }
    response
}

/// Multi-line labeled report for the combined vehicle-health view.
fn vehicle_health_report(
    data: &serde_json::Map<String, Value>,
    vehicle_id: Option<&str>,
    date_str: &str,
) -> String {
    let vehicle_id = vehicle_id.unwrap_or("Unknown");
    let mut report = format!("📅 {date_str}\n\n");
    report.push_str(&format!("🚗 **VEHICLE HEALTH REPORT: {vehicle_id}**\n"));

    if let Some(info) = data.get("vehicle_info").and_then(Value::as_object) {
        report.push_str(&format!("- ID: {}\n", field(info, "name")));
        report.push_str(&format!("- Registration: {}\n", field(info, "registration")));
        report.push_str(&format!("- Status: {}\n", field(info, "status")));
    }
    if let Some(allocation) = data.get("allocation").and_then(Value::as_object) {
        report.push_str(&format!("- Driver: {}\n", field(allocation, "engineer_name")));
    }
    if let Some(maintenance) = data.get("maintenance").and_then(Value::as_object) {
        report.push_str(&format!(
            "- Next service: {}\n",
            field(maintenance, "next_service_date")
        ));
        report.push_str(&format!(
            "- Next MOT: {}\n",
            field(maintenance, "next_mot_date")
        ));
    }
    if let Some(location) = data.get("live_location").and_then(Value::as_object) {
        report.push_str(&format!("📍 Last seen: {}\n", field(location, "address")));
    }
    if let Some(trips) = data.get("trip_summary").and_then(Value::as_object) {
        report.push_str(&format!(
            "- Trips (7d): {}, distance {} km\n",
            field(trips, "trips"),
            field(trips, "distance_km")
        ));
    }
    if let Some(diagnostics) = data.get("diagnostics").and_then(Value::as_array) {
        report.push_str(&format!("⚠️ Diagnostic codes: {}\n", diagnostics.len()));
    }
    report
}

fn field(map: &serde_json::Map<String, Value>, key: &str) -> String {
    map.get(key).map_or_else(|| "N/A".to_string(), display)
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "N/A".to_string(),
        other => other.to_string(),
    }
}

/// Sanitize formatted text down to plain text: markup markers out,
/// bullets to hyphens, optional emoji/ellipsis stripping, collapsed
/// dash/newline runs, right-trimmed lines. Idempotent.
pub fn sanitize(text: &str, remove_emojis: bool, remove_ellipsis: bool) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut out = text.replace("**", "");
    out = out.replace('\t', " ");
    out = out.replace('•', "-");
    if remove_ellipsis {
        out = out.replace("...", "");
    }
    if remove_emojis {
        match RE_EMOJI.as_ref() {
            Some(re) => out = re.replace_all(&out, "").into_owned(),
            None => {
                for glyph in EMOJI_FALLBACK {
                    out = out.replace(glyph, "");
                }
            }
        }
    }
    out = RE_STARS.replace_all(&out, "").into_owned();
    out = RE_DASHES.replace_all(&out, "---").into_owned();
    out = RE_NEWLINES.replace_all(&out, "\n\n").into_owned();
    out = out
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    format!("{}\n", out.trim())
}

/// The plain style: everything stripped.
pub fn sanitize_plain(text: &str) -> String {
    sanitize(text, true, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_protocol::intent::{DataSource, Intent, IntentResult};
    use serde_json::json;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 4).unwrap()
    }

    fn base_result(intent: Intent) -> ExecutionResult {
        ExecutionResult {
            intent: IntentResult::new(intent),
            data: None,
            source: None,
            context: None,
            count: 0,
            vehicle_id: None,
            error: None,
        }
    }

    #[test]
    fn error_renders_single_line() {
        let mut result = base_result(Intent::Error);
        result.error = Some("classifier offline".into());
        assert_eq!(format_with_date(&result, date()), "ℹ️ classifier offline");
    }

    #[test]
    fn missing_data_renders_fixed_message() {
        let result = base_result(Intent::FuelData);
        let text = format_with_date(&result, date());
        assert!(text.contains("No data available"));
        assert!(text.contains("Possible reasons"));
    }

    #[test]
    fn empty_list_is_no_data() {
        let mut result = base_result(Intent::FuelData);
        result.data = Some(json!([]));
        assert!(format_with_date(&result, date()).contains("No data available"));
    }

    #[test]
    fn list_renders_count() {
        let mut result = base_result(Intent::MaintenanceDue);
        result.data = Some(json!([{"name": "VEH-1"}, {"name": "VEH-2"}]));
        let text = format_with_date(&result, date());
        assert!(text.contains("February 04, 2026"));
        assert!(text.contains("Found 2 records"));
    }

    #[test]
    fn mapping_renders_line_per_key() {
        let mut result = base_result(Intent::FleetHealth);
        result.data = Some(json!({"vehicles_tracked": 12, "drivers_on_file": 9}));
        let text = format_with_date(&result, date());
        assert!(text.contains("- vehicles_tracked: 12"));
        assert!(text.contains("- drivers_on_file: 9"));
    }

    #[test]
    fn health_report_is_labeled() {
        let mut result = base_result(Intent::VehicleHealth);
        result.vehicle_id = Some("VEH-00330".into());
        result.context = Some(ResultContext::VehicleHealth);
        result.source = Some(DataSource::Combined);
        result.data = Some(json!({
            "vehicle_info": {"name": "VEH-00330", "registration": "AB12 CDE", "status": "Allocated"},
            "allocation": {"engineer_name": "Jane Doe"},
            "live_location": {"address": "Croydon CR0 2LX"},
            "sources": ["crm", "telematics"]
        }));
        let text = format_with_date(&result, date());
        assert!(text.contains("VEHICLE HEALTH REPORT: VEH-00330"));
        assert!(text.contains("- Registration: AB12 CDE"));
        assert!(text.contains("- Driver: Jane Doe"));
        assert!(text.contains("Last seen: Croydon CR0 2LX"));
    }

    // ── sanitizer ───────────────────────────────────────────────

    #[test]
    fn sanitize_strips_markup_and_bullets() {
        let out = sanitize_plain("**Bold** line\n• item one\n• item two");
        assert_eq!(out, "Bold line\n- item one\n- item two\n");
    }

    #[test]
    fn sanitize_strips_emoji_in_plain_mode() {
        let out = sanitize_plain("📅 February 04, 2026\n🚗 report");
        assert!(!out.contains('📅'));
        assert!(!out.contains('🚗'));
        assert!(out.contains("February 04, 2026"));
    }

    #[test]
    fn sanitize_keeps_emoji_when_asked() {
        let out = sanitize("🚗 report", false, false);
        assert!(out.contains('🚗'));
    }

    #[test]
    fn sanitize_collapses_runs() {
        let out = sanitize_plain("a\n\n\n\nb\n-------\nc");
        assert_eq!(out, "a\n\nb\n---\nc\n");
    }

    #[test]
    fn sanitize_removes_ellipsis_in_plain_mode() {
        assert_eq!(sanitize_plain("loading... done"), "loading done\n");
        assert!(sanitize("loading... done", true, false).contains("..."));
    }

    #[test]
    fn sanitize_trailing_whitespace_per_line() {
        assert_eq!(sanitize_plain("a   \nb\t"), "a\nb\n");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let mut result = base_result(Intent::VehicleHealth);
        result.vehicle_id = Some("VEH-00330".into());
        result.context = Some(ResultContext::VehicleHealth);
        result.data = Some(json!({
            "vehicle_info": {"name": "VEH-00330", "registration": "AB12 CDE", "status": "Allocated"},
            "sources": ["crm"]
        }));
        let formatted = format_with_date(&result, date());
        let once = sanitize_plain(&formatted);
        let twice = sanitize_plain(&once);
        assert_eq!(once, twice);

        let arbitrary = "** weird • input...\n\n\n\n----- end   ";
        assert_eq!(
            sanitize_plain(arbitrary),
            sanitize_plain(&sanitize_plain(arbitrary))
        );
    }

    #[test]
    fn sanitize_empty_stays_empty() {
        assert_eq!(sanitize_plain(""), "");
    }
}
