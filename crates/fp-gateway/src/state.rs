//! Shared application state for the Axum server.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use fp_crm::{CrmApi, MockCrm};
use fp_protocol::report::ReportKind;
use fp_telematics::{MockTelematics, TelematicsApi};

use crate::assist::{IntentClassifier, TieredClassifier};
use crate::cache::ScoreCache;
use crate::config::GatewayConfig;
use crate::session::SessionStore;
use crate::vision::{NoVision, VisionAnalyzer};

/// Shared application state, cloneable into every handler.
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<dyn CrmApi>,
    pub telematics: Arc<dyn TelematicsApi>,
    pub vision: Arc<dyn VisionAnalyzer>,
    pub classifier: Arc<dyn IntentClassifier>,
    pub sessions: SessionStore,
    pub score_cache: ScoreCache,
    pub config: GatewayConfig,
}

impl AppState {
    pub fn new(
        crm: Arc<dyn CrmApi>,
        telematics: Arc<dyn TelematicsApi>,
        vision: Arc<dyn VisionAnalyzer>,
        classifier: Arc<dyn IntentClassifier>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            crm,
            telematics,
            vision,
            classifier,
            sessions: SessionStore::new(config.session_ttl_hours),
            score_cache: ScoreCache::new(Duration::from_secs(config.score_cache_ttl_secs)),
            config,
        }
    }

    /// In-memory state with sample rows in both collaborators, for
    /// development and tests.
    pub fn with_sample_data() -> Self {
        let telematics = MockTelematics::new()
            .with_report(
                ReportKind::DriverRoster,
                vec![
                    json!({"name1": "Jane Doe", "email": "jane.doe@fleet.co.uk"}),
                    json!({"name1": "Sam Patel (IG8)", "email": "sam.patel@fleet.co.uk"}),
                ],
            )
            .with_report(
                ReportKind::OptiDriveIndicator,
                vec![
                    json!({"drivername": "Jane Doe", "optidrive_indicator": 0.87}),
                    json!({"drivername": "Sam Patel", "optidrive_indicator": 0.93}),
                ],
            )
            .with_report(
                ReportKind::ObjectPositions,
                vec![
                    json!({
                        "objectname": "AB12 CDE - Jane Doe - Electrical",
                        "drivername": "Jane Doe",
                        "postext": "4 Mill Lane, Croydon CR0 2LX"
                    }),
                    json!({
                        "objectname": "CD34 EFG - Sam Patel - Drainage",
                        "drivername": "Sam Patel",
                        "postext": "Romford RM1 1AA"
                    }),
                ],
            )
            .with_report(
                ReportKind::TripReport,
                vec![json!({"distance": 42.0, "drivingtime": 1.5, "fuelusage": 4.2})],
            )
            .with_report(
                ReportKind::EventReport,
                vec![json!({"objectname": "AB12 CDE", "drivername": "Jane Doe", "speed": 92.0})],
            )
            .with_report(
                ReportKind::FuelReport,
                vec![json!({"objectname": "AB12 CDE", "fuelusage": 38.5, "distance": 410.0})],
            )
            .with_report(
                ReportKind::IdlingReport,
                vec![json!({"objectname": "CD34 EFG", "idle_hours": 2.6})],
            );

        Self::new(
            Arc::new(MockCrm::with_sample_data()),
            Arc::new(telematics),
            Arc::new(NoVision),
            Arc::new(TieredClassifier::rules_only()),
            GatewayConfig::default(),
        )
    }
}
