//! CRM query collaborator.
//!
//! The CRM is a black box that answers filter queries with flat rows.
//! `CrmApi` is the seam the rest of the system programs against;
//! `RestCrm` talks to the real query endpoint with exhaustive pagination,
//! `MockCrm` serves canned rows for tests. Every failure degrades to an
//! empty result — callers never see transport errors.

pub mod api;
pub mod mock;
pub mod query;
pub mod rest;

pub use api::{CrmApi, CrmRow};
pub use mock::MockCrm;
pub use query::CrmQuery;
pub use rest::{CrmConfig, RestCrm};
