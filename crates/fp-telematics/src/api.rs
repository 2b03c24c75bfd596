//! The `TelematicsApi` trait.

use async_trait::async_trait;
use serde_json::Value;

use fp_protocol::report::ReportRequest;

/// Access to the telematics provider's report endpoint.
///
/// Returns the report's JSON array, or `None` when the call failed, the
/// response was non-2xx, or the payload was not a list. Callers treat
/// `None` and an empty list as the same outward signal.
#[async_trait]
pub trait TelematicsApi: Send + Sync {
    async fn fetch_report(&self, request: &ReportRequest) -> Option<Vec<Value>>;
}
