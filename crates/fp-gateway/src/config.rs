//! Gateway configuration, loadable from TOML or environment.

use serde::Deserialize;

/// Settings for the LLM classifier (OpenAI-compatible chat endpoint).
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    /// Whether the LLM tier runs at all; the keyword rules always do.
    #[serde(default)]
    pub enabled: bool,
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".into()
}
fn default_llm_timeout_secs() -> u64 {
    10
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            api_key: String::new(),
            model: default_llm_model(),
            timeout_secs: default_llm_timeout_secs(),
            enabled: false,
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty means allow any.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// The single email domain allowed to open sessions.
    #[serde(default = "default_email_domain")]
    pub allowed_email_domain: String,
    /// Worker-pool width for the batch score fan-out.
    #[serde(default = "default_fan_out")]
    pub score_fan_out: usize,
    /// How long the batch score map stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub score_cache_ttl_secs: u64,
    /// Session lifetime.
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,
    #[serde(default)]
    pub llm: LlmConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_email_domain() -> String {
    "@fleetpulse.co.uk".to_string()
}
fn default_fan_out() -> usize {
    8
}
fn default_cache_ttl_secs() -> u64 {
    600
}
fn default_session_ttl_hours() -> u64 {
    24
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            allowed_email_domain: default_email_domain(),
            score_fan_out: default_fan_out(),
            score_cache_ttl_secs: default_cache_ttl_secs(),
            session_ttl_hours: default_session_ttl_hours(),
            llm: LlmConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Defaults with environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(host) = std::env::var("GATEWAY_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("GATEWAY_PORT")
            && let Ok(port) = port.parse()
        {
            config.port = port;
        }
        if let Ok(domain) = std::env::var("ALLOWED_EMAIL_DOMAIN") {
            config.allowed_email_domain = domain;
        }
        if let Ok(key) = std::env::var("LLM_API_KEY") {
            config.llm.api_key = key;
        }
        if let Ok(base) = std::env::var("LLM_BASE_URL") {
            config.llm.base_url = base;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm.model = model;
        }
        config.llm.enabled = std::env::var("LLM_ENABLED")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false)
            && !config.llm.api_key.is_empty();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.score_fan_out, 8);
        assert!(!config.llm.enabled);
        assert!(config.allowed_email_domain.starts_with('@'));
    }

    #[test]
    fn deserialize_minimal_toml() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.session_ttl_hours, 24);
    }

    #[test]
    fn deserialize_full_toml() {
        let toml = r#"
host = "127.0.0.1"
port = 9000
allowed_email_domain = "@example.org"
score_fan_out = 4

[llm]
base_url = "http://localhost:11434/v1"
model = "test-model"
enabled = true
"#;
        let config: GatewayConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.allowed_email_domain, "@example.org");
        assert_eq!(config.score_fan_out, 4);
        assert!(config.llm.enabled);
        assert_eq!(config.llm.model, "test-model");
    }
}
