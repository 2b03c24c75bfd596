//! The `CrmApi` trait — typed query surface over the CRM's row store.

use async_trait::async_trait;

use fp_protocol::roster::EngineerRecord;

/// One flat CRM row. Nested sub-records arrive pre-flattened by the
/// client implementations.
pub type CrmRow = serde_json::Map<String, serde_json::Value>;

/// Typed query surface over the CRM.
///
/// Pagination is exhaustive — implementations never surface partial
/// pages. All methods degrade to empty on collaborator failure; "no
/// rows" and "CRM unavailable" are the same outward signal.
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Every vehicle on file.
    async fn all_vehicles(&self) -> Vec<CrmRow>;

    /// One vehicle by name, registration, or van number.
    async fn vehicle_by_identifier(&self, identifier: &str) -> Option<CrmRow>;

    /// Vehicles whose status is any of the given values.
    async fn vehicles_by_status(&self, statuses: &[String]) -> Vec<CrmRow>;

    /// Vehicles stationed at a service territory / depot.
    async fn vehicles_by_location(&self, territory: &str) -> Vec<CrmRow>;

    /// Allocations for one vehicle, or all currently-open allocations
    /// when no identifier is given.
    async fn vehicle_allocations(&self, identifier: Option<&str>) -> Vec<CrmRow>;

    /// Cost records, newest first, capped at `limit`.
    async fn vehicle_costs(&self, identifier: Option<&str>, limit: usize) -> Vec<CrmRow>;

    /// Maintenance fields for one vehicle, or every vehicle with a
    /// pending service/MOT date when no identifier is given.
    async fn vehicle_maintenance(&self, identifier: Option<&str>) -> Vec<CrmRow>;

    /// Vehicles with an MOT due inside the window.
    async fn mot_due_within(&self, days: u32) -> Vec<CrmRow>;

    /// Vehicles with road tax due inside the window.
    async fn tax_due_within(&self, days: u32) -> Vec<CrmRow>;

    /// Active engineers that have a contact email.
    async fn active_engineers(&self) -> Vec<EngineerRecord>;
}
