//! Shared utilities.
//!
//! Includes:
//! - Date/time helpers (flexible parsing for heuristic-extracted dates,
//!   UTC second-precision normalization for store comparisons)
//! - Signature similarity (cosine over integer min-hash vectors)

pub mod datetime;
pub mod similarity;

pub use datetime::{format_store_timestamp, parse_flexible_datetime, truncate_to_seconds};
pub use similarity::cosine_similarity;
