//! # cadence-core
//!
//! Core types, traits, and abstractions for the cadence reminder backend.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other cadence crates depend on: the recurrence rule model, the
//! reminder and suggestion domain types, the post-commit change-notification
//! bus, and the repository/collaborator interfaces.

pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod pattern;
pub mod recurrence;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use events::{ChangeBus, ChangeEvent, ChangeScope, InvalidationReason, TxOutbox};
pub use models::{
    InteractionStatus, LifecycleStatus, Member, NextOccurrenceResult, Occurrence, Reminder,
    Suggestion, SuggestionStatus, TargetHistory, TargetType,
};
pub use pattern::{Detection, PatternSuggestion, PatternValue, StableType};
pub use recurrence::{EndCondition, Frequency, MonthlyRule, RecurrenceRule};
pub use traits::*;
