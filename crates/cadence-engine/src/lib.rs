//! # cadence-engine
//!
//! Pure algorithm library for cadence: recurrence expansion, suggestion
//! pattern detection, and canonical target-key hashing.
//!
//! Nothing in this crate performs I/O or holds state — every function is a
//! deterministic mapping from inputs to outputs, which is what makes the
//! temporal arithmetic and classification logic testable in isolation.
//!
//! ## Example
//!
//! ```ignore
//! use cadence_engine::{expand, next_occurrence};
//! use cadence_core::{EndCondition, RecurrenceRule};
//! use chrono::Weekday;
//!
//! let rule = RecurrenceRule::weekly(
//!     1,
//!     vec![Weekday::Mon, Weekday::Wed],
//!     EndCondition::ByCount(8),
//! );
//! let upcoming = expand(&rule, anchor, window_start, window_end);
//! let next = next_occurrence(&rule, anchor, after);
//! ```

pub mod detector;
pub mod recurrence;
pub mod target_key;

// Re-export core types
pub use cadence_core::*;

// Re-export engine entry points
pub use detector::detect;
pub use recurrence::{expand, next_occurrence, previous_occurrence, OccurrenceSeries};
pub use target_key::{group_key, hash_key, normalize, plan_key};
