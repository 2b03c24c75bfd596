//! Tiered classifier — keyword rules first, LLM fallback.
//!
//! The rules always produce something; `Help` is their miss signal. Only
//! a miss consults the LLM tier, and an LLM failure surfaces as an
//! `error` intent carrying the failure message — never a guess.

use async_trait::async_trait;
use serde_json::json;

use fp_protocol::intent::{ConversationTurn, Intent, IntentResult};

use super::llm::LlmClassifier;
use super::rules::{classify_message, resolve_entity};
use super::IntentClassifier;

/// Composite classifier: local rules, then optional LLM.
pub struct TieredClassifier {
    llm: Option<LlmClassifier>,
}

impl TieredClassifier {
    pub fn new(llm: Option<LlmClassifier>) -> Self {
        Self { llm }
    }

    /// Rules only — the configuration without an LLM backend.
    pub fn rules_only() -> Self {
        Self { llm: None }
    }
}

#[async_trait]
impl IntentClassifier for TieredClassifier {
    async fn classify(&self, message: &str, history: &[ConversationTurn]) -> IntentResult {
        let from_rules = classify_message(message, history);
        if from_rules.intent != Intent::Help {
            return from_rules;
        }

        let Some(llm) = &self.llm else {
            return from_rules;
        };

        tracing::debug!("keyword rules missed, consulting llm tier");
        let last_vehicle = resolve_entity(message, history);
        match llm.classify_question(message, last_vehicle.as_deref()).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, "llm classification failed");
                IntentResult::with_params(Intent::Error, json!({"message": e.to_string()}))
            }
        }
    }

    fn tier_name(&self) -> &str {
        "tiered"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn llm_for(server: &MockServer) -> LlmClassifier {
        LlmClassifier::new(LlmConfig {
            base_url: server.uri(),
            api_key: "k".into(),
            model: "m".into(),
            timeout_secs: 2,
            enabled: true,
        })
    }

    #[tokio::test]
    async fn rule_hit_skips_llm() {
        // No server mounted — a consulted LLM would fail the test.
        let tiered = TieredClassifier::rules_only();
        let result = tiered.classify("VEH-00330 health", &[]).await;
        assert_eq!(result.intent, Intent::VehicleHealth);
    }

    #[tokio::test]
    async fn rules_only_miss_stays_help() {
        let tiered = TieredClassifier::rules_only();
        let result = tiered.classify("what's the lease date for VEH-439", &[]).await;
        assert_eq!(result.intent, Intent::Help);
    }

    #[tokio::test]
    async fn llm_fallback_on_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content":
                    "{\"intent\": \"vehicle_lease\", \"entity\": \"VEH-439\", \"parameters\": {}}"
                }}]
            })))
            .mount(&server)
            .await;

        let tiered = TieredClassifier::new(Some(llm_for(&server)));
        let result = tiered.classify("what's the lease date for VEH-439", &[]).await;
        assert_eq!(result.intent, Intent::VehicleLease);
        assert_eq!(result.entity.as_deref(), Some("VEH-439"));
    }

    #[tokio::test]
    async fn llm_failure_is_error_intent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"content": "no json here"}}]
            })))
            .mount(&server)
            .await;

        let tiered = TieredClassifier::new(Some(llm_for(&server)));
        let result = tiered.classify("what's the lease date for it", &[]).await;
        assert_eq!(result.intent, Intent::Error);
        assert!(result.parameters["message"].as_str().unwrap().contains("not valid JSON"));
    }
}
