//! FleetPulse HTTP gateway — library crate.
//!
//! Re-exports all modules so the binary (`main.rs`) and the e2e test
//! crate can reach internal types like `AppState`, `build_router`, and
//! the assist pipeline.

pub mod assist;
pub mod cache;
pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod vision;
