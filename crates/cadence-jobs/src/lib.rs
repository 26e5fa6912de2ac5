//! # cadence-jobs
//!
//! Reactive and scheduled machinery for cadence.
//!
//! This crate provides:
//! - The post-commit change listener feeding the reminder lifecycle
//! - The reminder lifecycle manager and its daily refresh/cleanup sweeps
//! - The suggestion batch (pattern detection over recurring histories)
//! - Content-addressed suggestion invalidation
//! - The cron-driven sweep scheduler with overlap guarding
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use cadence_core::{defaults, ChangeBus};
//! use cadence_jobs::{
//!     AccountPurge, ChangeListener, DailyMaintenance, OccurrenceProvider,
//!     ReminderLifecycleManager, SchedulerConfig, SuggestionBatch,
//!     SuggestionInvalidationService, SweepScheduler,
//! };
//!
//! let (bus, rx) = ChangeBus::channel();
//! let provider = Arc::new(OccurrenceProvider::new(events, todos));
//! let lifecycle = Arc::new(ReminderLifecycleManager::new(reminder_repo.clone(), provider));
//! let invalidation = Arc::new(SuggestionInvalidationService::new(suggestion_repo.clone()));
//!
//! // Consume post-commit notifications.
//! let listener = ChangeListener::new(lifecycle.clone(), invalidation.clone()).spawn(rx);
//!
//! // Schedule the two periodic jobs.
//! let mut scheduler = SweepScheduler::new(SchedulerConfig::from_env());
//! scheduler.register(
//!     defaults::MAINTENANCE_CRON,
//!     Arc::new(DailyMaintenance::new(
//!         lifecycle,
//!         SuggestionBatch::new(targets, suggestion_repo.clone(), invalidation),
//!     )),
//! )?;
//! scheduler.register(
//!     defaults::ACCOUNT_PURGE_CRON,
//!     Arc::new(AccountPurge::new(member_repo, reminder_repo, suggestion_repo)),
//! )?;
//! let handle = scheduler.start();
//! ```

pub mod invalidation;
pub mod lifecycle;
pub mod listener;
pub mod maintenance;
pub mod message;
pub mod provider;
pub mod scheduler;

// Re-export core types
pub use cadence_core::*;

// Re-export job machinery
pub use invalidation::SuggestionInvalidationService;
pub use lifecycle::{ReminderLifecycleManager, SweepStats};
pub use listener::{ChangeListener, ListenerHandle};
pub use maintenance::{AccountPurge, BatchStats, DailyMaintenance, SuggestionBatch};
pub use message::build_message;
pub use provider::OccurrenceProvider;
pub use scheduler::{SchedulerConfig, SchedulerHandle, Sweep, SweepScheduler};
