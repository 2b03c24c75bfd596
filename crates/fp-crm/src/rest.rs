//! REST implementation of `CrmApi`.
//!
//! Talks to the CRM's query endpoint (`GET /query?q=...`) with a bearer
//! token, following continuation URLs until the result set is complete.
//! Row metadata keys are stripped and nested sub-records flattened in
//! place, so consumers always see plain field maps.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use fp_protocol::roster::EngineerRecord;

use crate::api::{CrmApi, CrmRow};
use crate::query::{escape, CrmQuery};

const VEHICLE_FIELDS: &[&str] = &[
    "id",
    "name",
    "registration",
    "van_number",
    "status",
    "trade_group",
    "vehicle_type",
    "make_model",
    "description",
    "tracking_number",
    "service_territory",
];

const VEHICLE_DETAIL_FIELDS: &[&str] = &[
    "id",
    "name",
    "registration",
    "van_number",
    "status",
    "trade_group",
    "vehicle_type",
    "make_model",
    "description",
    "tracking_number",
    "service_territory",
    "lease_start_date",
    "owned_start_date",
    "previous_drivers",
];

const MAINTENANCE_FIELDS: &[&str] = &[
    "id",
    "name",
    "registration",
    "van_number",
    "last_service_date",
    "next_service_date",
    "last_mot_date",
    "next_mot_date",
];

/// Connection settings for the CRM query endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CrmConfig {
    pub base_url: String,
    pub access_token: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl CrmConfig {
    /// Load settings from `CRM_BASE_URL`, `CRM_ACCESS_TOKEN`,
    /// `CRM_TIMEOUT_SECS`.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("CRM_BASE_URL").ok()?;
        let access_token = std::env::var("CRM_ACCESS_TOKEN").ok()?;
        let timeout_secs = std::env::var("CRM_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(default_timeout_secs);
        Some(Self {
            base_url,
            access_token,
            timeout_secs,
        })
    }
}

/// Wire shape of one query response page.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<Value>,
    #[serde(default = "default_done")]
    done: bool,
    #[serde(rename = "nextRecordsUrl")]
    next_records_url: Option<String>,
}

fn default_done() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
enum CrmError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("query endpoint returned status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Payload(String),
}

/// REST client for the CRM query endpoint.
pub struct RestCrm {
    client: reqwest::Client,
    config: CrmConfig,
}

impl RestCrm {
    pub fn new(config: CrmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    /// Run a query, following continuation URLs until `done`.
    async fn run(&self, query: &CrmQuery) -> Result<Vec<CrmRow>, CrmError> {
        let rendered = query.render();
        tracing::debug!(query = %rendered, "crm query");

        let mut rows = Vec::new();
        let mut page = self
            .fetch_page(&format!("{}/query", self.config.base_url), Some(&rendered))
            .await?;

        loop {
            rows.extend(page.records.iter().map(clean_row));
            if page.done {
                break;
            }
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            let url = format!("{}{}", self.config.base_url, next);
            page = self.fetch_page(&url, None).await?;
        }

        Ok(rows)
    }

    async fn fetch_page(&self, url: &str, q: Option<&str>) -> Result<QueryResponse, CrmError> {
        let mut request = self
            .client
            .get(url)
            .bearer_auth(&self.config.access_token);
        if let Some(q) = q {
            request = request.query(&[("q", q)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CrmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CrmError::Status(response.status().as_u16()));
        }

        response
            .json::<QueryResponse>()
            .await
            .map_err(|e| CrmError::Payload(e.to_string()))
    }

    /// Degrade a query result to empty rows, logging the failure.
    async fn run_or_empty(&self, query: &CrmQuery) -> Vec<CrmRow> {
        match self.run(query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "crm query failed, returning no rows");
                Vec::new()
            }
        }
    }
}

/// Strip metadata keys and flatten nested sub-records one level deep.
fn clean_row(raw: &Value) -> CrmRow {
    let mut row = CrmRow::new();
    let Some(object) = raw.as_object() else {
        return row;
    };
    for (key, value) in object {
        if key == "attributes" {
            continue;
        }
        match value {
            Value::Object(nested) => {
                let cleaned: serde_json::Map<String, Value> = nested
                    .iter()
                    .filter(|(k, _)| *k != "attributes")
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                row.insert(key.clone(), Value::Object(cleaned));
            }
            other => {
                row.insert(key.clone(), other.clone());
            }
        }
    }
    row
}

#[async_trait]
impl CrmApi for RestCrm {
    async fn all_vehicles(&self) -> Vec<CrmRow> {
        self.run_or_empty(&CrmQuery::select("vehicle", VEHICLE_FIELDS))
            .await
    }

    async fn vehicle_by_identifier(&self, identifier: &str) -> Option<CrmRow> {
        let query = CrmQuery::select("vehicle", VEHICLE_DETAIL_FIELDS)
            .filter(CrmQuery::identifier_filter(identifier))
            .limit(1);
        self.run_or_empty(&query).await.into_iter().next()
    }

    async fn vehicles_by_status(&self, statuses: &[String]) -> Vec<CrmRow> {
        let filter = match statuses {
            [] => return self.all_vehicles().await,
            [single] => format!("status = '{}'", escape(single)),
            many => {
                let values: Vec<String> =
                    many.iter().map(|s| format!("'{}'", escape(s))).collect();
                format!("status IN ({})", values.join(", "))
            }
        };
        let query = CrmQuery::select("vehicle", VEHICLE_FIELDS)
            .filter(filter)
            .order_by("name ASC");
        self.run_or_empty(&query).await
    }

    async fn vehicles_by_location(&self, territory: &str) -> Vec<CrmRow> {
        let query = CrmQuery::select("vehicle", VEHICLE_FIELDS)
            .filter(format!("service_territory = '{}'", escape(territory)))
            .order_by("status ASC");
        self.run_or_empty(&query).await
    }

    async fn vehicle_allocations(&self, identifier: Option<&str>) -> Vec<CrmRow> {
        let filter = match identifier {
            Some(id) => {
                let id = escape(id);
                format!(
                    "(vehicle_name = '{id}' OR registration = '{id}' OR van_number = '{id}')"
                )
            }
            None => "end_date = null".to_string(),
        };
        let query = CrmQuery::select(
            "vehicle_allocation",
            &[
                "id",
                "vehicle_name",
                "registration",
                "van_number",
                "engineer_name",
                "engineer_email",
                "start_date",
                "end_date",
                "reserved_for",
            ],
        )
        .filter(filter)
        .order_by("start_date DESC");
        self.run_or_empty(&query).await
    }

    async fn vehicle_costs(&self, identifier: Option<&str>, limit: usize) -> Vec<CrmRow> {
        let mut query = CrmQuery::select(
            "vehicle_cost",
            &[
                "vehicle_name",
                "registration",
                "cost_type",
                "amount",
                "date",
                "description",
            ],
        )
        .order_by("date DESC")
        .limit(limit);
        if let Some(id) = identifier {
            let id = escape(id);
            query = query.filter(format!(
                "vehicle_name = '{id}' OR registration = '{id}' OR van_number = '{id}'"
            ));
        }
        self.run_or_empty(&query).await
    }

    async fn vehicle_maintenance(&self, identifier: Option<&str>) -> Vec<CrmRow> {
        let filter = match identifier {
            Some(id) => CrmQuery::identifier_filter(id),
            None => "next_service_date != null OR next_mot_date != null".to_string(),
        };
        let query = CrmQuery::select("vehicle", MAINTENANCE_FIELDS)
            .filter(filter)
            .order_by("next_service_date ASC NULLS LAST");
        self.run_or_empty(&query).await
    }

    async fn mot_due_within(&self, days: u32) -> Vec<CrmRow> {
        // One attempt with the primary field, one with the legacy field
        // name, then give up. No retries beyond the alternate shape.
        let primary = CrmQuery::select("vehicle", MAINTENANCE_FIELDS)
            .filter(format!(
                "next_mot_date != null AND next_mot_date <= NEXT_N_DAYS:{days}"
            ))
            .order_by("next_mot_date ASC");
        match self.run(&primary).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "mot query failed, trying alternate field");
                let alternate = CrmQuery::select("vehicle", VEHICLE_FIELDS)
                    .filter(format!(
                        "mot_due_date != null AND mot_due_date <= NEXT_N_DAYS:{days}"
                    ))
                    .order_by("mot_due_date ASC");
                self.run_or_empty(&alternate).await
            }
        }
    }

    async fn tax_due_within(&self, days: u32) -> Vec<CrmRow> {
        let primary = CrmQuery::select("vehicle", VEHICLE_FIELDS)
            .filter(format!(
                "next_tax_date != null AND next_tax_date <= NEXT_N_DAYS:{days}"
            ))
            .order_by("next_tax_date ASC");
        match self.run(&primary).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(error = %e, "tax query failed, trying alternate field");
                let alternate = CrmQuery::select("vehicle", VEHICLE_FIELDS)
                    .filter(format!(
                        "tax_due_date != null AND tax_due_date <= NEXT_N_DAYS:{days}"
                    ))
                    .order_by("tax_due_date ASC");
                self.run_or_empty(&alternate).await
            }
        }
    }

    async fn active_engineers(&self) -> Vec<EngineerRecord> {
        let query = CrmQuery::select("engineer", &["id", "name", "email", "trade_group"])
            .filter("is_active = true AND email != null")
            .order_by("name ASC");
        self.run_or_empty(&query)
            .await
            .into_iter()
            .filter_map(|row| {
                let name = row.get("name")?.as_str()?.to_string();
                let email = row
                    .get("email")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let trade_group = row
                    .get("trade_group")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                Some(EngineerRecord {
                    name,
                    email,
                    trade_group,
                    is_active: true,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, Request, ResponseTemplate};

    fn config_for(server: &MockServer) -> CrmConfig {
        CrmConfig {
            base_url: server.uri(),
            access_token: "test-token".into(),
            timeout_secs: 2,
        }
    }

    fn query_contains(needle: &'static str) -> impl Fn(&Request) -> bool {
        move |req: &Request| req.url.query().is_some_and(|q| q.contains(needle))
    }

    #[tokio::test]
    async fn all_vehicles_strips_metadata() {
        let server = MockServer::start().await;
        let body = json!({
            "records": [
                {"attributes": {"type": "vehicle"}, "name": "VEH-00330", "status": "Allocated"}
            ],
            "done": true
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        let rows = crm.all_vehicles().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "VEH-00330");
        assert!(!rows[0].contains_key("attributes"));
    }

    #[tokio::test]
    async fn pagination_is_exhaustive() {
        let server = MockServer::start().await;
        let first = json!({
            "records": [{"name": "VEH-1"}],
            "done": false,
            "nextRecordsUrl": "/query/page2"
        });
        let second = json!({
            "records": [{"name": "VEH-2"}],
            "done": true
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&first))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/query/page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&second))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        let rows = crm.all_vehicles().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["name"], "VEH-2");
    }

    #[tokio::test]
    async fn failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        assert!(crm.all_vehicles().await.is_empty());
        assert!(crm.vehicle_by_identifier("VEH-1").await.is_none());
    }

    #[tokio::test]
    async fn nested_subrecords_flattened() {
        let server = MockServer::start().await;
        let body = json!({
            "records": [{
                "engineer_name": "A",
                "vehicle": {"attributes": {"type": "vehicle"}, "name": "VEH-9"}
            }],
            "done": true
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        let rows = crm.vehicle_allocations(None).await;
        assert_eq!(rows[0]["vehicle"]["name"], "VEH-9");
        assert!(rows[0]["vehicle"].get("attributes").is_none());
    }

    #[tokio::test]
    async fn mot_due_falls_back_to_alternate_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_contains("next_mot_date"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;
        let alt_body = json!({
            "records": [{"name": "VEH-7", "mot_due_date": "2026-02-20"}],
            "done": true
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_contains("mot_due_date"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&alt_body))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        let rows = crm.mot_due_within(30).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "VEH-7");
    }

    #[tokio::test]
    async fn active_engineers_mapped() {
        let server = MockServer::start().await;
        let body = json!({
            "records": [
                {"name": "Jane Doe", "email": "jane@fleet.co.uk", "trade_group": "Drainage"},
                {"name": "No Email Row"}
            ],
            "done": true
        });
        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let crm = RestCrm::new(config_for(&server));
        let engineers = crm.active_engineers().await;
        assert_eq!(engineers.len(), 2);
        assert_eq!(engineers[0].email.as_deref(), Some("jane@fleet.co.uk"));
        assert!(engineers[1].email.is_none());
    }
}
