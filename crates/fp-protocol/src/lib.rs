//! Shared types for FleetPulse.
//!
//! Plain-data structs and enums exchanged between the identity/scoring
//! cores, the CRM and telematics collaborators, and the HTTP gateway.

pub mod intent;
pub mod report;
pub mod roster;
pub mod score;
pub mod telemetry;
