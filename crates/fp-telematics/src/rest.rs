//! REST implementation of `TelematicsApi`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use fp_protocol::report::ReportRequest;

use crate::api::TelematicsApi;

/// Connection settings for the provider's report endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TelematicsConfig {
    pub base_url: String,
    pub account: String,
    pub username: String,
    pub password: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl TelematicsConfig {
    /// Load settings from `TELEMATICS_*` environment variables.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            base_url: std::env::var("TELEMATICS_BASE_URL").ok()?,
            account: std::env::var("TELEMATICS_ACCOUNT").ok()?,
            username: std::env::var("TELEMATICS_USERNAME").ok()?,
            password: std::env::var("TELEMATICS_PASSWORD").ok()?,
            api_key: std::env::var("TELEMATICS_API_KEY").ok()?,
            timeout_secs: std::env::var("TELEMATICS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout_secs),
        })
    }
}

/// REST client for the provider's single report endpoint.
pub struct RestTelematics {
    client: reqwest::Client,
    config: TelematicsConfig,
}

impl RestTelematics {
    pub fn new(config: TelematicsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    fn params(&self, request: &ReportRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account", self.config.account.clone()),
            ("apikey", self.config.api_key.clone()),
            ("lang", "en".to_string()),
            ("action", request.kind.action().to_string()),
            ("outputformat", "json".to_string()),
            ("useUTF8", "true".to_string()),
            ("useISO8601", "true".to_string()),
        ];
        if let Some(range) = &request.range {
            params.push(("rangefrom_string", range.from_compact()));
            params.push(("rangeto_string", range.to_compact()));
        }
        if let Some(object) = &request.object {
            params.push(("objectno", object.clone()));
        }
        params
    }
}

#[async_trait]
impl TelematicsApi for RestTelematics {
    async fn fetch_report(&self, request: &ReportRequest) -> Option<Vec<Value>> {
        let action = request.kind.action();
        let response = match self
            .client
            .get(&self.config.base_url)
            .query(&self.params(request))
            .basic_auth(&self.config.username, Some(&self.config.password))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(error = %e, action, "telematics request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), action, "telematics returned non-200");
            return None;
        }

        let payload: Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, action, "telematics payload was not JSON");
                return None;
            }
        };

        match payload {
            Value::Array(rows) => Some(rows),
            other => {
                tracing::warn!(
                    kind = %other.to_string().chars().take(40).collect::<String>(),
                    action,
                    "telematics payload was not a list"
                );
                None
            }
        }
    }
}
