//! Identifier normalization and cross-source record matching.
//!
//! The CRM and the telematics provider share no primary key. This crate
//! holds the canonicalization rules (names with embedded area-code tags,
//! emails, postcodes inside free-text addresses), the two-stage matcher
//! that resolves a telematics driver against a CRM engineer, the batch
//! score join, and the roster cleaning pass.

pub mod matcher;
pub mod normalize;
pub mod reconcile;
pub mod roster;

pub use matcher::{match_driver, MatchTarget};
pub use normalize::{extract_postcode, is_plausible_human_name, normalize_email, normalize_name};
pub use reconcile::join_scores;
pub use roster::{build_roster, RosterReport};
