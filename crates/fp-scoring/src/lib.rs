//! Score normalization and severity classification.
//!
//! Pure, deterministic functions: provider-native scales (0–1 driving
//! indicator, raw speeds, idle hours, diagnostic trouble codes) in,
//! normalized scales and discrete bands out.

pub mod dtc;
pub mod events;
pub mod scale;

pub use dtc::{classify_code, describe_code};
pub use events::{classify_idle_severity, classify_speed_severity};
pub use scale::{classify_score, score_record, to_percent_scale, to_ten_scale};
