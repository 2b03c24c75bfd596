//! LLM classifier tier — few-shot JSON classification over an
//! OpenAI-compatible chat endpoint.
//!
//! The model must answer with a single JSON object
//! `{"intent": ..., "entity": ..., "parameters": {...}}`. Output that
//! fails strict JSON validation, or names an intent outside the
//! allow-list, is a classification failure — never guessed at or
//! partially parsed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use fp_protocol::intent::{Intent, IntentResult};

use crate::config::LlmConfig;

/// Intent tokens the model is allowed to produce.
const KNOWN_INTENTS: &[&str] = &[
    "vehicle_count",
    "count_by_status",
    "vehicle_info",
    "vehicle_lease",
    "vehicle_driver",
    "vehicle_costs",
    "maintenance_due",
    "all_drivers",
    "spare_vehicles",
    "vehicles_by_location",
    "vehicle_health",
    "live_location",
];

const SYSTEM_PROMPT: &str =
    "You are a precise JSON classifier. Always output valid JSON only.";

/// Few-shot classification prompt, parameterized by the question and the
/// most recently mentioned vehicle.
fn classification_prompt(question: &str, last_vehicle: Option<&str>) -> String {
    let context = last_vehicle.unwrap_or("None");
    format!(
        r#"You are an expert at understanding questions about vehicle fleet management.

Your job: analyze the user's question and output a JSON object with the intent and parameters.

IMPORTANT CONTEXT:
- Previous vehicle mentioned: {context}
- If the user says "it", "this", "that vehicle", use the previous vehicle

=== EXAMPLES ===

User: "How many vehicles are there in total"
Output: {{"intent": "vehicle_count", "entity": null, "parameters": {{}}}}

User: "Tell me about VEH-439"
Output: {{"intent": "vehicle_info", "entity": "VEH-439", "parameters": {{}}}}

User: "What's the lease date for it?" (previous vehicle VEH-439)
Output: {{"intent": "vehicle_lease", "entity": "VEH-439", "parameters": {{}}}}

User: "Who is driving that vehicle?" (previous vehicle VEH-439)
Output: {{"intent": "vehicle_driver", "entity": "VEH-439", "parameters": {{}}}}

User: "Show me the costs for this vehicle" (previous vehicle VEH-439)
Output: {{"intent": "vehicle_costs", "entity": "VEH-439", "parameters": {{}}}}

User: "How many allocated vehicles?"
Output: {{"intent": "count_by_status", "entity": null, "parameters": {{"status": "Allocated"}}}}

User: "List all drivers"
Output: {{"intent": "all_drivers", "entity": null, "parameters": {{}}}}

User: "Show spare drainage vans"
Output: {{"intent": "spare_vehicles", "entity": null, "parameters": {{"trade_group": "Drainage"}}}}

User: "What vehicles need maintenance?"
Output: {{"intent": "maintenance_due", "entity": null, "parameters": {{}}}}

User: "Show me vehicles at Croydon depot"
Output: {{"intent": "vehicles_by_location", "entity": null, "parameters": {{"location": "Croydon"}}}}

=== AVAILABLE INTENTS ===
vehicle_count, count_by_status, vehicle_info, vehicle_lease, vehicle_driver,
vehicle_costs, maintenance_due, all_drivers, spare_vehicles,
vehicles_by_location, vehicle_health, live_location

=== NOW CLASSIFY THIS ===
User question: "{question}"
Previous vehicle context: {context}

Output only valid JSON in this exact format:
{{"intent": "intent_name", "entity": "vehicle_id or null", "parameters": {{}}}}"#
    )
}

/// Ways the LLM tier can fail. All of them surface as an `error` intent
/// upstream; none abort the request.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("classifier request failed: {0}")]
    Transport(String),
    #[error("classifier returned status {0}")]
    Status(u16),
    #[error("classifier response missing content")]
    EmptyResponse,
    #[error("classifier output was not valid JSON: {0}")]
    MalformedOutput(String),
    #[error("classifier produced unknown intent '{0}'")]
    UnknownIntent(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Raw model output before validation.
#[derive(Debug, Deserialize)]
struct RawClassification {
    intent: String,
    #[serde(default)]
    entity: Option<String>,
    #[serde(default)]
    parameters: Value,
}

/// Few-shot LLM classifier.
pub struct LlmClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl LlmClassifier {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    /// Classify one question. `last_vehicle` is the pronoun context from
    /// the rolling history.
    pub async fn classify_question(
        &self,
        question: &str,
        last_vehicle: Option<&str>,
    ) -> Result<IntentResult, LlmError> {
        let prompt = classification_prompt(question, last_vehicle);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.1,
            max_tokens: 300,
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(LlmError::Status(response.status().as_u16()));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(LlmError::EmptyResponse)?;

        parse_classification(&content)
    }
}

/// Validate the model's text output into an `IntentResult`.
fn parse_classification(content: &str) -> Result<IntentResult, LlmError> {
    let json_str = extract_json(content);
    let raw: RawClassification = serde_json::from_str(json_str)
        .map_err(|e| LlmError::MalformedOutput(format!("{e} — raw: {content}")))?;

    if !KNOWN_INTENTS.contains(&raw.intent.as_str()) {
        return Err(LlmError::UnknownIntent(raw.intent));
    }
    let intent: Intent = serde_json::from_value(Value::String(raw.intent.clone()))
        .map_err(|_| LlmError::UnknownIntent(raw.intent))?;

    let entity = raw
        .entity
        .filter(|e| {
            let trimmed = e.trim();
            !trimmed.is_empty() && trimmed != "null"
        })
        .map(|e| e.to_uppercase());
    let parameters = match raw.parameters {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(serde_json::Map::new()),
    };

    Ok(IntentResult {
        intent,
        entity,
        parameters,
    })
}

/// Extract JSON from model output that may be wrapped in markdown fences.
fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();

    if let Some(start) = trimmed.find("```json") {
        let after_fence = &trimmed[start + 7..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        if let Some(end) = after_fence.find("```") {
            return after_fence[..end].trim();
        }
    }

    trimmed
}
