//! FleetPulse gateway binary.
//!
//! Wires the CRM and telematics collaborators (real REST clients when
//! credentials are present, sample-data mocks otherwise), the tiered
//! intent classifier, and the HTTP router.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use fp_crm::{CrmApi, CrmConfig, MockCrm, RestCrm};
use fp_telematics::{MockTelematics, RestTelematics, TelematicsApi, TelematicsConfig};

use fp_gateway::assist::llm::LlmClassifier;
use fp_gateway::assist::TieredClassifier;
use fp_gateway::config::GatewayConfig;
use fp_gateway::routes::build_router;
use fp_gateway::state::AppState;
use fp_gateway::vision::NoVision;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "fp-gateway starting");

    let config = match std::env::var("GATEWAY_CONFIG") {
        Ok(path) => GatewayConfig::from_file(&path)?,
        Err(_) => GatewayConfig::from_env(),
    };

    let crm: Arc<dyn CrmApi> = match CrmConfig::from_env() {
        Some(crm_config) => {
            tracing::info!("using CRM query endpoint");
            Arc::new(RestCrm::new(crm_config))
        }
        None => {
            tracing::warn!("CRM credentials not set — using in-memory sample data");
            Arc::new(MockCrm::with_sample_data())
        }
    };

    let telematics: Arc<dyn TelematicsApi> = match TelematicsConfig::from_env() {
        Some(telematics_config) => {
            tracing::info!("using telematics report endpoint");
            Arc::new(RestTelematics::new(telematics_config))
        }
        None => {
            tracing::warn!("telematics credentials not set — using empty mock");
            Arc::new(MockTelematics::new())
        }
    };

    let llm = config
        .llm
        .enabled
        .then(|| LlmClassifier::new(config.llm.clone()));
    if llm.is_some() {
        tracing::info!(model = %config.llm.model, "llm classifier tier enabled");
    }
    let classifier = Arc::new(TieredClassifier::new(llm));

    let state = AppState::new(crm, telematics, Arc::new(NoVision), classifier, config.clone());
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
