//! In-memory `TelematicsApi` for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

use fp_protocol::report::{ReportKind, ReportRequest};

use crate::api::TelematicsApi;

/// Serves canned rows per report kind. Unconfigured kinds return an
/// empty list; kinds marked failing return `None` like a dead endpoint.
#[derive(Debug, Clone, Default)]
pub struct MockTelematics {
    reports: HashMap<ReportKind, Vec<Value>>,
    failures: HashSet<ReportKind>,
}

impl MockTelematics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_report(mut self, kind: ReportKind, rows: Vec<Value>) -> Self {
        self.reports.insert(kind, rows);
        self
    }

    pub fn failing(mut self, kind: ReportKind) -> Self {
        self.failures.insert(kind);
        self
    }
}

#[async_trait]
impl TelematicsApi for MockTelematics {
    async fn fetch_report(&self, request: &ReportRequest) -> Option<Vec<Value>> {
        if self.failures.contains(&request.kind) {
            return None;
        }
        Some(self.reports.get(&request.kind).cloned().unwrap_or_default())
    }
}
