//! Telematics report collaborator.
//!
//! The provider serves every report through one request shape: an action
//! token plus a parameter mapping. `TelematicsApi` is the seam; the REST
//! client fills it against the real endpoint, the mock serves canned
//! rows. `reports` turns raw rows into typed records, `scores` holds the
//! per-email driving-score lookup and its bounded-concurrency batch.

pub mod api;
pub mod mock;
pub mod reports;
pub mod rest;
pub mod scores;

pub use api::TelematicsApi;
pub use mock::MockTelematics;
pub use rest::{RestTelematics, TelematicsConfig};
pub use scores::{batch_scores, gather_fleet_scores, lookup_score_by_email};
