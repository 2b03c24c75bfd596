//! Keyword rule classifier — an ordered list of `(predicate, builder)`
//! pairs evaluated first-match-wins.
//!
//! Rule order is load-bearing: a message matching several rules always
//! resolves to the earliest one. The list itself is public so tests can
//! pin the order.

use async_trait::async_trait;
use regex::Regex;
use serde_json::json;
use std::sync::LazyLock;

use fp_protocol::intent::{ConversationTurn, Intent, IntentResult};

use super::IntentClassifier;

/// Vehicle identifier: prefix plus 3–5 digits, scanned over the
/// upper-cased message.
static RE_ENTITY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"VEH-\d{3,5}").unwrap());

/// Looser pattern for history scanning — older turns may carry ids
/// rendered by us or typed by the user in any case.
static RE_HISTORY_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VEH-\d+").unwrap());

/// How many trailing history turns the pronoun scan looks at.
const HISTORY_WINDOW: usize = 5;

/// Usage hint returned when no rule matches.
pub const HELP_HINT: &str =
    r#"Try: "VEH-00330 health", "driving scores", "maintenance due", "fuel consumption""#;

/// Extract a vehicle id from one piece of text.
pub fn extract_entity_id(text: &str) -> Option<String> {
    RE_ENTITY
        .find(&text.to_uppercase())
        .map(|m| m.as_str().to_string())
}

/// Resolve the vehicle id for a message: direct mention first, then the
/// most recently mentioned id in the last few turns (most recent turn
/// wins).
pub fn resolve_entity(message: &str, history: &[ConversationTurn]) -> Option<String> {
    if let Some(id) = extract_entity_id(message) {
        return Some(id);
    }
    history
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .find_map(|turn| {
            RE_HISTORY_ENTITY
                .find(&turn.content)
                .map(|m| m.as_str().to_uppercase())
        })
}

/// Pre-computed inputs shared by every rule predicate.
pub struct RuleInput {
    /// Lower-cased message text.
    pub lower: String,
    /// Resolved vehicle id, when any.
    pub entity: Option<String>,
}

/// One classification rule.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&RuleInput) -> Option<IntentResult>,
}

fn matches_any(text: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| text.contains(p))
}

fn vehicle_health(input: &RuleInput) -> Option<IntentResult> {
    if matches_any(&input.lower, &["health", "status", "check", "info"]) {
        let entity = input.entity.clone()?;
        return Some(IntentResult::with_entity(Intent::VehicleHealth, entity));
    }
    None
}

fn fleet(input: &RuleInput) -> Option<IntentResult> {
    if !input.lower.contains("fleet") {
        return None;
    }
    Some(match input.entity.clone() {
        Some(entity) => IntentResult::with_entity(Intent::VehicleHealth, entity),
        None => IntentResult::new(Intent::FleetHealth),
    })
}

fn maintenance(input: &RuleInput) -> Option<IntentResult> {
    matches_any(&input.lower, &["maintenance", "service due", "need service"])
        .then(|| IntentResult::new(Intent::MaintenanceDue))
}

fn driving_scores(input: &RuleInput) -> Option<IntentResult> {
    matches_any(&input.lower, &["driving score", "driver performance"]).then(|| {
        IntentResult::with_params(Intent::DrivingScores, json!({"days": 7}))
    })
}

fn fuel(input: &RuleInput) -> Option<IntentResult> {
    if !input.lower.contains("fuel") {
        return None;
    }
    let days = if input.lower.contains("week") { 7 } else { 1 };
    Some(IntentResult::with_params(
        Intent::FuelData,
        json!({"days": days}),
    ))
}

fn idle(input: &RuleInput) -> Option<IntentResult> {
    input
        .lower
        .contains("idle")
        .then(|| IntentResult::with_params(Intent::IdleWaste, json!({"days": 1})))
}

fn speeding(input: &RuleInput) -> Option<IntentResult> {
    matches_any(&input.lower, &["speeding", "speed"]).then(|| {
        IntentResult::with_params(Intent::SpeedingAlerts, json!({"hours": 24}))
    })
}

fn live_location(input: &RuleInput) -> Option<IntentResult> {
    if matches_any(&input.lower, &["where is", "location"]) {
        let entity = input.entity.clone()?;
        return Some(IntentResult::with_entity(Intent::LiveLocation, entity));
    }
    None
}

fn all_positions(input: &RuleInput) -> Option<IntentResult> {
    matches_any(
        &input.lower,
        &["all vehicle", "show vehicles", "vehicle positions"],
    )
    .then(|| IntentResult::new(Intent::AllPositions))
}

fn vehicle_count(input: &RuleInput) -> Option<IntentResult> {
    input
        .lower
        .contains("how many")
        .then(|| IntentResult::new(Intent::VehicleCount))
}

/// The rule list, in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "vehicle_health",
        apply: vehicle_health,
    },
    Rule {
        name: "fleet",
        apply: fleet,
    },
    Rule {
        name: "maintenance",
        apply: maintenance,
    },
    Rule {
        name: "driving_scores",
        apply: driving_scores,
    },
    Rule {
        name: "fuel",
        apply: fuel,
    },
    Rule {
        name: "idle",
        apply: idle,
    },
    Rule {
        name: "speeding",
        apply: speeding,
    },
    Rule {
        name: "live_location",
        apply: live_location,
    },
    Rule {
        name: "all_positions",
        apply: all_positions,
    },
    Rule {
        name: "vehicle_count",
        apply: vehicle_count,
    },
];

/// Classify a message against the rule list. Falls through to `Help`.
pub fn classify_message(message: &str, history: &[ConversationTurn]) -> IntentResult {
    let input = RuleInput {
        lower: message.to_lowercase(),
        entity: resolve_entity(message, history),
    };
    for rule in RULES {
        if let Some(result) = (rule.apply)(&input) {
            tracing::debug!(rule = rule.name, intent = %result.intent, "rule matched");
            return result;
        }
    }
    IntentResult::new(Intent::Help)
}

/// Keyword-rule classifier tier.
pub struct RuleClassifier;

impl RuleClassifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentClassifier for RuleClassifier {
    async fn classify(&self, message: &str, history: &[ConversationTurn]) -> IntentResult {
        classify_message(message, history)
    }

    fn tier_name(&self) -> &str {
        "rules"
    }
}
