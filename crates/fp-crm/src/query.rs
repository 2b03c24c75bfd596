//! Query description builder for the CRM's query endpoint.
//!
//! The endpoint accepts a single query-language string. This builder
//! keeps construction in one place so the REST client stays free of
//! string assembly, and escapes quote characters in caller-supplied
//! values.

/// A CRM query under construction.
#[derive(Debug, Clone)]
pub struct CrmQuery {
    entity: String,
    fields: Vec<String>,
    filter: Option<String>,
    order_by: Option<String>,
    limit: Option<usize>,
}

/// Escape a literal value for embedding in a filter expression.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

impl CrmQuery {
    pub fn select(entity: &str, fields: &[&str]) -> Self {
        Self {
            entity: entity.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            filter: None,
            order_by: None,
            limit: None,
        }
    }

    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filter = Some(expr.into());
        self
    }

    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_by = Some(expr.into());
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    /// Filter expression matching a vehicle by any of its identifiers.
    pub fn identifier_filter(identifier: &str) -> String {
        let id = escape(identifier);
        format!("name = '{id}' OR registration = '{id}' OR van_number = '{id}'")
    }

    /// Render to the query-language string sent to the endpoint.
    pub fn render(&self) -> String {
        let mut out = format!("SELECT {} FROM {}", self.fields.join(", "), self.entity);
        if let Some(filter) = &self.filter {
            out.push_str(" WHERE ");
            out.push_str(filter);
        }
        if let Some(order) = &self.order_by {
            out.push_str(" ORDER BY ");
            out.push_str(order);
        }
        if let Some(limit) = self.limit {
            out.push_str(&format!(" LIMIT {limit}"));
        }
        out
    }
}
